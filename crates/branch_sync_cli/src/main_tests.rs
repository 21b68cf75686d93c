use super::*;
use clap::CommandFactory;

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_sync_with_dry_run_and_config() {
    let cli = Cli::try_parse_from(["branch-sync", "sync", "--dry-run", "--config", "x.toml"])
        .unwrap();

    match cli.command {
        Commands::Sync(args) => {
            assert!(args.dry_run);
            assert_eq!(args.config.as_deref(), Some("x.toml"));
        }
        _ => panic!("Expected sync command"),
    }
}

#[test]
fn test_parse_export_requires_repo() {
    assert!(Cli::try_parse_from(["branch-sync", "export"]).is_err());

    let cli = Cli::try_parse_from([
        "branch-sync",
        "export",
        "--repo",
        "acme/widgets",
        "--output",
        "out.json",
    ])
    .unwrap();
    match cli.command {
        Commands::Export(args) => {
            assert_eq!(args.repo, "acme/widgets");
            assert_eq!(args.output, Some(std::path::PathBuf::from("out.json")));
        }
        _ => panic!("Expected export command"),
    }
}

#[test]
fn test_parse_auth_subcommands() {
    let cli = Cli::try_parse_from(["branch-sync", "auth", "github"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Auth(AuthCommands::GitHub { ref method }) if method == "token"
    ));

    let cli = Cli::try_parse_from(["branch-sync", "auth", "check"]).unwrap();
    assert!(matches!(cli.command, Commands::Auth(AuthCommands::Check)));
}

#[test]
fn test_parse_validate_and_discover() {
    let cli = Cli::try_parse_from(["branch-sync", "validate", "--file", "p.json"]).unwrap();
    assert!(matches!(cli.command, Commands::Validate(ref a) if a.file.is_some()));

    let cli = Cli::try_parse_from(["branch-sync", "discover", "--topic", "guarded"]).unwrap();
    assert!(matches!(cli.command, Commands::Discover(ref a) if a.topic.as_deref() == Some("guarded")));
}
