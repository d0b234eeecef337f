//! Handlers for `wayfarer register`, `login`, `logout` and `whoami`.

use anyhow::{Context, Result};

use wayfarer_api::ApiClient;

use crate::prompt;

pub async fn run_register(
    client: &ApiClient,
    email: &str,
    name: &str,
    password: Option<String>,
) -> Result<()> {
    let password = prompt::value_or_prompt(password, "Password")?;
    let user = client
        .register(email, name, &password)
        .await
        .context("registration failed")?;

    println!("Account created.");
    println!("  ID:    {}", user.id);
    println!("  Email: {}", user.email);
    println!("  Name:  {}", user.name);
    println!();
    println!("Next: run `wayfarer login {}` to sign in.", user.email);
    Ok(())
}

pub async fn run_login(client: &mut ApiClient, email: &str, password: Option<String>) -> Result<()> {
    let password = prompt::value_or_prompt(password, "Password")?;
    let auth = client
        .login(email, &password)
        .await
        .context("login failed")?;
    println!("Signed in as {} <{}>", auth.user.name, auth.user.email);
    Ok(())
}

pub fn run_logout(client: &mut ApiClient) -> Result<()> {
    let was_signed_in = client.session().is_authenticated();
    client.logout().context("failed to clear stored session")?;
    if was_signed_in {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

pub async fn run_whoami(client: &ApiClient, remote: bool) -> Result<()> {
    if !client.session().is_authenticated() {
        anyhow::bail!("not signed in; run `wayfarer login <email>`");
    }

    let user = if remote {
        client
            .current_user()
            .await
            .context("failed to fetch current user")?
    } else {
        match client.cached_user() {
            Some(user) => user.clone(),
            None => client
                .current_user()
                .await
                .context("failed to fetch current user")?,
        }
    };

    println!("{} <{}>", user.name, user.email);
    println!("  ID: {}", user.id);
    Ok(())
}
