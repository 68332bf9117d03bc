use crate::notify::{LogMailer, MailOptions};
use crate::store::Store;
use crate::types::User;

use super::{confirm_action, find_user, init_store};

pub fn run_user_add(
    data_dir: String,
    name: String,
    email: String,
    staff: bool,
    superuser: bool,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    if store.get_namespace_by_name(&name)?.is_some() {
        anyhow::bail!("Namespace '{}' already exists", name);
    }

    let mut user = if superuser {
        User::new_superuser(name, &email)
    } else {
        User::new(name, &email)
    };
    user.is_staff |= staff;

    store.create_user(&user)?;

    println!(
        "Created user \"{}\" with namespace \"{}\" ({})",
        user.name, user.name, user.id
    );
    Ok(())
}

pub fn run_user_remove(data_dir: String, name: String, yes: bool) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;
    let user = find_user(&store, &name)?;

    confirm_action(yes)?;

    if store.delete_user(&user.id)? {
        println!("Removed user \"{}\"", user.name);
    }
    Ok(())
}

pub fn run_user_email(
    data_dir: String,
    name: String,
    subject: String,
    message: String,
    from: Option<String>,
) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;
    let user = find_user(&store, &name)?;

    if user.email.is_empty() {
        anyhow::bail!("User '{}' has no email address", user.name);
    }

    user.email_user(
        &LogMailer,
        &subject,
        &message,
        from.as_deref(),
        &MailOptions::default(),
    )?;

    println!("Queued mail to \"{}\" <{}>", user.name, user.email);
    Ok(())
}
