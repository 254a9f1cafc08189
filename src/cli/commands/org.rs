use clap::Subcommand;
use serde_json::{json, Map, Value};

use crate::cli::client::ApiClient;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

const ORGANIZATIONS: &str = "/api/v1/organizations";

#[derive(Subcommand)]
pub enum OrgCommands {
    #[command(about = "List organizations")]
    List {
        #[arg(long, help = "Records to skip")]
        skip: Option<u32>,
        #[arg(long, help = "Maximum records to return (server caps at 100)")]
        limit: Option<u32>,
        #[arg(long, help = "Only active organizations")]
        active_only: bool,
    },

    #[command(about = "Show an organization by id or code")]
    Show {
        #[arg(help = "Organization id, or code with --code")]
        target: String,
        #[arg(long, help = "Treat the target as an organization code")]
        code: bool,
    },

    #[command(about = "Create a new organization")]
    Create {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Unique organization code")]
        code: String,
        #[arg(long, help = "Unique domain")]
        domain: Option<String>,
        #[arg(long, help = "Logo URL")]
        logo_url: Option<String>,
        #[arg(long, help = "Create the organization inactive")]
        inactive: bool,
    },

    #[command(about = "Update fields of an organization")]
    Update {
        #[arg(help = "Organization id")]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        logo_url: Option<String>,
    },

    #[command(about = "Mark an organization active")]
    Activate {
        #[arg(help = "Organization id")]
        id: i64,
    },

    #[command(about = "Mark an organization inactive (its requests are refused)")]
    Deactivate {
        #[arg(help = "Organization id")]
        id: i64,
    },

    #[command(about = "Delete an organization and everything it owns")]
    Delete {
        #[arg(help = "Organization id")]
        id: i64,
    },
}

pub async fn handle(cmd: OrgCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        OrgCommands::List {
            skip,
            limit,
            active_only,
        } => {
            let path = list_path(skip, limit, active_only);
            let orgs = client.get(&path).await?;
            let orgs = orgs.as_array().cloned().unwrap_or_default();

            if orgs.is_empty() {
                return output_empty_collection(&output_format, "organizations", "No organizations found");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "organizations": orgs }))?);
                }
                OutputFormat::Text => {
                    println!("{:<6} {:<16} {:<32} {}", "ID", "CODE", "NAME", "STATUS");
                    for org in &orgs {
                        println!(
                            "{:<6} {:<16} {:<32} {}",
                            org["id"],
                            org["code"].as_str().unwrap_or(""),
                            org["name"].as_str().unwrap_or(""),
                            status_label(org)
                        );
                    }
                }
            }
            Ok(())
        }
        OrgCommands::Show { target, code } => {
            let path = if code {
                format!("{}/by-code/{}", ORGANIZATIONS, target)
            } else {
                let id: i64 = target
                    .parse()
                    .map_err(|_| anyhow::anyhow!("'{}' is not an organization id (use --code for codes)", target))?;
                format!("{}/{}", ORGANIZATIONS, id)
            };
            let org = client.get(&path).await?;
            output_organization(&output_format, &org)
        }
        OrgCommands::Create {
            name,
            code,
            domain,
            logo_url,
            inactive,
        } => {
            let mut body = Map::new();
            body.insert("name".to_string(), json!(name));
            body.insert("code".to_string(), json!(code));
            insert_some(&mut body, "domain", domain);
            insert_some(&mut body, "logo_url", logo_url);
            if inactive {
                body.insert("is_active".to_string(), json!(false));
            }

            let org = client.post(ORGANIZATIONS, &Value::Object(body)).await?;
            output_success(
                &output_format,
                &format!("Organization '{}' created with id {}", code, org["id"]),
                Some(json!({ "organization": org })),
            )
        }
        OrgCommands::Update {
            id,
            name,
            code,
            domain,
            logo_url,
        } => {
            let mut body = Map::new();
            insert_some(&mut body, "name", name);
            insert_some(&mut body, "code", code);
            insert_some(&mut body, "domain", domain);
            insert_some(&mut body, "logo_url", logo_url);
            if body.is_empty() {
                anyhow::bail!("nothing to update; pass at least one field flag");
            }

            let org = client
                .put(&format!("{}/{}", ORGANIZATIONS, id), &Value::Object(body))
                .await?;
            output_success(
                &output_format,
                &format!("Organization {} updated", id),
                Some(json!({ "organization": org })),
            )
        }
        OrgCommands::Activate { id } => set_active(client, &output_format, id, true).await,
        OrgCommands::Deactivate { id } => set_active(client, &output_format, id, false).await,
        OrgCommands::Delete { id } => {
            client.delete(&format!("{}/{}", ORGANIZATIONS, id)).await?;
            output_success(&output_format, &format!("Organization {} deleted", id), None)
        }
    }
}

async fn set_active(client: &ApiClient, output_format: &OutputFormat, id: i64, active: bool) -> anyhow::Result<()> {
    let org = client
        .put(&format!("{}/{}", ORGANIZATIONS, id), &json!({ "is_active": active }))
        .await?;
    output_success(
        output_format,
        &format!("Organization {} is now {}", id, status_label(&org)),
        Some(json!({ "organization": org })),
    )
}

fn list_path(skip: Option<u32>, limit: Option<u32>, active_only: bool) -> String {
    let mut params = Vec::new();
    if let Some(skip) = skip {
        params.push(format!("skip={}", skip));
    }
    if let Some(limit) = limit {
        params.push(format!("limit={}", limit));
    }
    if active_only {
        params.push("active_only=true".to_string());
    }

    if params.is_empty() {
        ORGANIZATIONS.to_string()
    } else {
        format!("{}?{}", ORGANIZATIONS, params.join("&"))
    }
}

fn insert_some(body: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        body.insert(key.to_string(), json!(value));
    }
}

fn status_label(org: &Value) -> &'static str {
    if org["is_active"].as_bool().unwrap_or(false) {
        "active"
    } else {
        "inactive"
    }
}

fn output_organization(output_format: &OutputFormat, org: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "organization": org }))?);
        }
        OutputFormat::Text => {
            println!("Organization {}: {}", org["id"], org["name"].as_str().unwrap_or(""));
            println!("Code: {}", org["code"].as_str().unwrap_or(""));
            if let Some(domain) = org["domain"].as_str() {
                println!("Domain: {}", domain);
            }
            if let Some(logo_url) = org["logo_url"].as_str() {
                println!("Logo: {}", logo_url);
            }
            println!("Status: {}", status_label(org));
        }
    }
    Ok(())
}
