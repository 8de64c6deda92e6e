use std::path::PathBuf;

use clap::Args;

use crate::cli::client::{ContactClient, ContactFields, ListParams};
use crate::cli::utils::{output_contact, output_contact_page, output_success};
use crate::cli::{Commands, OutputFormat};

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, help = "Case-insensitive name substring")]
    pub name: Option<String>,
    #[arg(long, help = "Only favorites (true) or non-favorites (false)")]
    pub favorite: Option<bool>,
    #[arg(long, help = "Page number, starting at 1")]
    pub page: Option<u32>,
    #[arg(long, help = "Contacts per page")]
    pub limit: Option<u32>,
}

/// Optional fields shared by create and update. An empty string clears a field on update.
#[derive(Debug, Args)]
pub struct ContactArgs {
    #[arg(long, help = "Email address")]
    pub email: Option<String>,
    #[arg(long, help = "Phone number")]
    pub phone: Option<String>,
    #[arg(long, help = "Postal address")]
    pub address: Option<String>,
    #[arg(long, help = "Mark as favorite (true/false)")]
    pub favorite: Option<bool>,
    #[arg(long, help = "Image file to upload as avatar")]
    pub avatar: Option<PathBuf>,
}

impl ContactArgs {
    fn into_parts(self, name: Option<String>) -> (ContactFields, Option<PathBuf>) {
        let fields = ContactFields {
            name,
            email: self.email,
            address: self.address,
            phone: self.phone,
            favorite: self.favorite,
        };
        (fields, self.avatar)
    }
}

pub async fn handle(cmd: Commands, client: &ContactClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        Commands::List(args) => {
            let params = ListParams {
                name: args.name,
                favorite: args.favorite,
                page: args.page,
                limit: args.limit,
            };
            let page = client.list(&params).await?;
            output_contact_page(&output_format, &page)
        }
        Commands::Show { id } => {
            let data = client.get(&id).await?;
            output_contact(&output_format, &data["contact"])
        }
        Commands::Create { name, fields } => {
            let (fields, avatar) = fields.into_parts(Some(name));
            let data = client.create(&fields, avatar.as_deref()).await?;
            let contact = &data["contact"];
            output_success(
                &output_format,
                &format!("Created contact {}", contact["id"]),
                Some(data.clone()),
            )
        }
        Commands::Update { id, name, fields } => {
            let (fields, avatar) = fields.into_parts(name);
            let data = client.update(&id, &fields, avatar.as_deref()).await?;
            output_success(&output_format, &format!("Updated contact {}", id), Some(data))
        }
        Commands::Delete { id } => {
            client.delete(&id).await?;
            output_success(&output_format, &format!("Deleted contact {}", id), None)
        }
        Commands::DeleteAll { yes } => {
            if !yes {
                return Err(anyhow::anyhow!("Refusing to delete all contacts without --yes"));
            }
            client.delete_all().await?;
            output_success(&output_format, "Deleted all contacts", None)
        }
        Commands::Health => {
            let data = client.health().await?;
            output_success(
                &output_format,
                &format!("{} is healthy", client.base()),
                Some(data),
            )
        }
    }
}
