// Contact form and newsletter

use anyhow::{bail, Result};
use clap::Args;
use tokenforge_sdk::forms::{
    send_contact_message, subscribe_newsletter, ContactFields, FormClient, FormSubmission,
};

use super::utils::{success, warn, CliContext};

#[derive(Args)]
pub struct ContactCmd {
    /// Reply address
    #[arg(long)]
    email: String,

    #[arg(long)]
    message: String,
}

#[derive(Args)]
pub struct NewsletterCmd {
    #[arg(long)]
    email: String,
}

fn report(submission: FormSubmission, on_success: &str) -> Result<()> {
    if submission.succeeded {
        success(on_success);
        return Ok(());
    }
    for error in &submission.errors {
        match &error.field {
            Some(field) => warn(&format!("{} {}", field, error.message)),
            None => warn(&error.message),
        }
    }
    bail!("Form was not accepted")
}

pub async fn execute(cmd: ContactCmd, ctx: &CliContext) -> Result<()> {
    let client = FormClient::new(ctx.config.forms.clone());
    let submission =
        send_contact_message(&client, &ContactFields::new(cmd.email, cmd.message)).await?;
    report(submission, "Message sent! We'll get back to you soon.")
}

pub async fn subscribe(cmd: NewsletterCmd, ctx: &CliContext) -> Result<()> {
    let client = FormClient::new(ctx.config.forms.clone());
    let submission = subscribe_newsletter(&client, &cmd.email).await?;
    report(submission, "Subscribed!")
}
