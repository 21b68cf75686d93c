//! Fake GitHub client shared by the command tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use github_client::{
    Branch, BranchProtection, BranchProtectionUpdate, EnabledSetting, Error, Repository,
    RepositoryClient, RepositoryPermissions, User,
};

pub fn repository(owner: &str, name: &str, topics: &[&str], admin: bool) -> Repository {
    Repository {
        name: name.to_string(),
        full_name: format!("{owner}/{name}"),
        owner: User {
            id: 7,
            login: owner.to_string(),
        },
        topics: topics.iter().map(|t| t.to_string()).collect(),
        permissions: Some(RepositoryPermissions {
            admin,
            ..Default::default()
        }),
        archived: false,
    }
}

/// Protection with only "include administrators" set.
pub fn admins_protection(enabled: bool) -> BranchProtection {
    BranchProtection {
        enforce_admins: Some(EnabledSetting { enabled }),
        ..Default::default()
    }
}

#[derive(Default)]
pub struct FakeGitHub {
    login: Option<String>,
    repositories: Vec<Repository>,
    branches: HashMap<String, Vec<Branch>>,
    protections: HashMap<(String, String), BranchProtection>,
    failing_mutations: HashSet<(String, String)>,
    calls: Mutex<Vec<String>>,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self {
            login: Some("octocat".to_string()),
            ..Default::default()
        }
    }

    /// Every call to the user endpoint fails with "Bad credentials".
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    pub fn with_repository(mut self, repository: Repository) -> Self {
        self.branches
            .entry(repository.full_name.clone())
            .or_default();
        self.repositories.push(repository);
        self
    }

    pub fn with_branch(mut self, repo: &str, name: &str, protection: Option<BranchProtection>) -> Self {
        self.branches.entry(repo.to_string()).or_default().push(Branch {
            name: name.to_string(),
            protected: protection.is_some(),
        });
        if let Some(protection) = protection {
            self.protections
                .insert((repo.to_string(), name.to_string()), protection);
        }
        self
    }

    pub fn with_failing_mutation(mut self, repo: &str, branch: &str) -> Self {
        self.failing_mutations
            .insert((repo.to_string(), branch.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn mutate(&self, verb: &str, owner: &str, repo: &str, branch: &str) -> Result<(), Error> {
        let full_name = format!("{owner}/{repo}");
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{verb} {full_name} {branch}"));
        }
        if self
            .failing_mutations
            .contains(&(full_name, branch.to_string()))
        {
            return Err(Error::ApiError {
                status: 422,
                message: "Validation Failed".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RepositoryClient for FakeGitHub {
    async fn get_authenticated_user(&self) -> Result<User, Error> {
        match &self.login {
            Some(login) => Ok(User {
                id: 1,
                login: login.clone(),
            }),
            None => Err(Error::AuthError("Bad credentials".to_string())),
        }
    }

    async fn list_user_repositories(&self) -> Result<Vec<Repository>, Error> {
        Ok(self.repositories.clone())
    }

    async fn list_branches(&self, owner: &str, repo: &str) -> Result<Vec<Branch>, Error> {
        self.branches
            .get(&format!("{owner}/{repo}"))
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn get_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Option<BranchProtection>, Error> {
        Ok(self
            .protections
            .get(&(format!("{owner}/{repo}"), branch.to_string()))
            .cloned())
    }

    async fn update_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        _protection: &BranchProtectionUpdate,
    ) -> Result<(), Error> {
        self.mutate("update", owner, repo, branch)
    }

    async fn delete_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<(), Error> {
        self.mutate("delete", owner, repo, branch)
    }
}
