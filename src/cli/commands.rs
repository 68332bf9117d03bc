use clap::Subcommand;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a new user and their namespace
    Add {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Username, which is also the namespace name
        #[arg(long)]
        name: String,

        /// Email address
        #[arg(long, default_value = "")]
        email: String,

        /// Mark the user as staff
        #[arg(long)]
        staff: bool,

        /// Mark the user as superuser (implies staff)
        #[arg(long)]
        superuser: bool,
    },

    /// Remove a user with their namespace and projects
    Remove {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Username to remove
        #[arg(long)]
        name: String,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Send a message to a user's email address
    Email {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Username to send to
        #[arg(long)]
        name: String,

        /// Subject line
        #[arg(long)]
        subject: String,

        /// Message body
        #[arg(long)]
        message: String,

        /// Sender address
        #[arg(long)]
        from: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum OrgCommands {
    /// Add a new organization with an empty "Owners" team
    Add {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Organization name
        #[arg(long)]
        name: String,
    },

    /// Remove an organization with its projects and teams
    Remove {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Organization name
        #[arg(long)]
        name: String,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Unlink projects the organization no longer owns from all its teams
    Repair {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Organization name
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Add a project to a user or organization namespace
    Add {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Owning namespace name
        #[arg(long)]
        namespace: String,

        /// Project name
        #[arg(long)]
        name: String,

        /// Project description
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Move a project to another namespace (teams are not repaired)
    Move {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Project to move, as NAMESPACE/PROJECT
        #[arg(long)]
        project: String,

        /// Destination namespace name
        #[arg(long)]
        to: String,
    },
}

#[derive(Subcommand)]
pub enum PermissionCommands {
    /// Add a permission to the catalog
    Add {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Slug checked during permission resolution
        #[arg(long)]
        slug: String,

        /// Human-readable name
        #[arg(long)]
        name: String,

        /// Description of the right being granted
        #[arg(long)]
        description: String,

        /// The permission is global rather than project-level
        #[arg(long)]
        global: bool,
    },
}

#[derive(Subcommand)]
pub enum TeamCommands {
    /// Create a team under an organization or a project
    Add {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Team name
        #[arg(long)]
        name: String,

        /// Organization name for an organization team
        #[arg(long, conflicts_with = "project", required_unless_present = "project")]
        org: Option<String>,

        /// Project, as NAMESPACE/PROJECT, for a project team
        #[arg(long)]
        project: Option<String>,

        /// Members pass every permission check
        #[arg(long)]
        owner: bool,

        /// Organization team applies to all of the organization's projects
        #[arg(long, requires = "org", conflicts_with = "project")]
        all_projects: bool,
    },

    /// Add a user to a team
    Member {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Team ID
        #[arg(long)]
        team_id: String,

        /// Username to add
        #[arg(long)]
        user: String,
    },

    /// Grant every catalog permission with the given slug to a team
    Grant {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Team ID
        #[arg(long)]
        team_id: String,

        /// Permission slug
        #[arg(long)]
        slug: String,
    },

    /// Link an organization team to one of the organization's projects
    Link {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Team ID
        #[arg(long)]
        team_id: String,

        /// Project, as NAMESPACE/PROJECT
        #[arg(long)]
        project: String,
    },

    /// Report whether a team's project links are consistent
    Check {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Team ID
        #[arg(long)]
        team_id: String,
    },

    /// Unlink projects owned outside the team's organization
    Repair {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Team ID
        #[arg(long)]
        team_id: String,
    },
}
