use clap::Args;
use localagent_app_state::AuthContainer;
use localagent_client::store_token;
use localagent_types::LoginCredentials;

use crate::context;

#[derive(Args)]
pub struct LoginArgs {
    /// Account username
    #[arg(long)]
    pub username: String,
    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(args: LoginArgs) -> anyhow::Result<()> {
    let client = context::api_client().await?;
    let auth = AuthContainer::new(client.clone()).await;

    let credentials = LoginCredentials {
        username: args.username,
        password: args.password,
    };
    let user = auth.login(&credentials).await?;

    if let Some(token) = client.token().await {
        store_token(&token)?;
    }

    println!("logged in as {}", user.username);
    context::print_json(&user)
}
