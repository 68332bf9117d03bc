use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gatehouse::cli::{
    OrgCommands, PermissionCommands, ProjectCommands, TeamCommands, UserCommands, run_check,
    run_info, run_init, run_org_add, run_org_remove, run_org_repair, run_permission_add,
    run_project_add, run_project_move, run_team_add, run_team_check, run_team_grant,
    run_team_link, run_team_member, run_team_repair, run_user_add, run_user_email,
    run_user_remove,
};

#[derive(Parser)]
#[command(name = "gatehouse")]
#[command(about = "Team-based project permissions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and database
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage organizations
    Org {
        #[command(subcommand)]
        command: OrgCommands,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Manage the permission catalog
    Permission {
        #[command(subcommand)]
        command: PermissionCommands,
    },

    /// Manage teams
    Team {
        #[command(subcommand)]
        command: TeamCommands,
    },

    /// Check whether a user holds a permission
    Check {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Acting username
        #[arg(long)]
        user: String,

        /// Permission slug
        #[arg(long)]
        slug: String,

        /// Target project, as NAMESPACE/PROJECT
        #[arg(long, conflicts_with = "namespace", required_unless_present = "namespace")]
        project: Option<String>,

        /// Target user or organization namespace
        #[arg(long)]
        namespace: Option<String>,
    },

    /// Show store contents
    Info {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("gatehouse=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { data_dir } => run_init(data_dir)?,
        Commands::User { command } => match command {
            UserCommands::Add {
                data_dir,
                name,
                email,
                staff,
                superuser,
            } => run_user_add(data_dir, name, email, staff, superuser)?,
            UserCommands::Remove {
                data_dir,
                name,
                yes,
            } => run_user_remove(data_dir, name, yes)?,
            UserCommands::Email {
                data_dir,
                name,
                subject,
                message,
                from,
            } => run_user_email(data_dir, name, subject, message, from)?,
        },
        Commands::Org { command } => match command {
            OrgCommands::Add { data_dir, name } => run_org_add(data_dir, name)?,
            OrgCommands::Remove {
                data_dir,
                name,
                yes,
            } => run_org_remove(data_dir, name, yes)?,
            OrgCommands::Repair { data_dir, name } => run_org_repair(data_dir, name)?,
        },
        Commands::Project { command } => match command {
            ProjectCommands::Add {
                data_dir,
                namespace,
                name,
                description,
            } => run_project_add(data_dir, namespace, name, description)?,
            ProjectCommands::Move {
                data_dir,
                project,
                to,
            } => run_project_move(data_dir, project, to)?,
        },
        Commands::Permission { command } => match command {
            PermissionCommands::Add {
                data_dir,
                slug,
                name,
                description,
                global,
            } => run_permission_add(data_dir, slug, name, description, global)?,
        },
        Commands::Team { command } => match command {
            TeamCommands::Add {
                data_dir,
                name,
                org,
                project,
                owner,
                all_projects,
            } => run_team_add(data_dir, name, org, project, owner, all_projects)?,
            TeamCommands::Member {
                data_dir,
                team_id,
                user,
            } => run_team_member(data_dir, team_id, user)?,
            TeamCommands::Grant {
                data_dir,
                team_id,
                slug,
            } => run_team_grant(data_dir, team_id, slug)?,
            TeamCommands::Link {
                data_dir,
                team_id,
                project,
            } => run_team_link(data_dir, team_id, project)?,
            TeamCommands::Check { data_dir, team_id } => run_team_check(data_dir, team_id)?,
            TeamCommands::Repair { data_dir, team_id } => run_team_repair(data_dir, team_id)?,
        },
        Commands::Check {
            data_dir,
            user,
            slug,
            project,
            namespace,
        } => run_check(data_dir, user, slug, project, namespace)?,
        Commands::Info { data_dir, json } => run_info(data_dir, json)?,
    }

    Ok(())
}
