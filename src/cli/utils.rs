use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "status": "success",
                "message": message
            });
            if let Some(data_value) = data {
                response["data"] = data_value;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "status": "fail",
                    "message": message
                }))?
            );
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output a single contact in the appropriate format
pub fn output_contact(output_format: &OutputFormat, contact: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(contact)?),
        OutputFormat::Text => print!("{}", format_contact(contact)),
    }
    Ok(())
}

/// Output a page of contacts and its metadata in the appropriate format
pub fn output_contact_page(output_format: &OutputFormat, page: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(page)?),
        OutputFormat::Text => {
            let contacts = page["contacts"].as_array().map(Vec::as_slice).unwrap_or_default();
            if contacts.is_empty() {
                println!("No contacts found");
            } else {
                println!("{:<6} {:<3} {:<24} {:<28} {}", "ID", "FAV", "NAME", "EMAIL", "PHONE");
                for contact in contacts {
                    println!(
                        "{:<6} {:<3} {:<24} {:<28} {}",
                        field(contact, "id"),
                        if contact["favorite"].as_bool().unwrap_or(false) { "*" } else { "" },
                        field(contact, "name"),
                        field(contact, "email"),
                        field(contact, "phone"),
                    );
                }
            }
            let meta = &page["metadata"];
            println!(
                "Page {} of {} ({} total, {} per page)",
                field(meta, "page"),
                field(meta, "lastPage"),
                field(meta, "totalRecords"),
                field(meta, "limit"),
            );
        }
    }
    Ok(())
}

pub fn format_contact(contact: &Value) -> String {
    let mut out = String::new();
    for (label, key) in [
        ("ID", "id"),
        ("Name", "name"),
        ("Email", "email"),
        ("Phone", "phone"),
        ("Address", "address"),
        ("Favorite", "favorite"),
        ("Avatar", "avatar"),
        ("Created", "created_at"),
        ("Updated", "updated_at"),
    ] {
        let value = field(contact, key);
        if !value.is_empty() {
            out.push_str(&format!("{:<9} {}\n", format!("{}:", label), value));
        }
    }
    out
}

/// Render a JSON scalar for text output; null and missing become empty
fn field(value: &Value, key: &str) -> String {
    match &value[key] {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_present_fields_only() {
        let text = format_contact(&json!({
            "id": 3,
            "name": "Alice",
            "email": null,
            "favorite": true
        }));
        assert!(text.contains("ID:       3"));
        assert!(text.contains("Name:     Alice"));
        assert!(text.contains("Favorite: true"));
        assert!(!text.contains("Email"));
    }
}
