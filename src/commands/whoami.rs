use owo_colors::OwoColorize;
use serde_json::json;

use super::{AppContext, CommandOutput};
use crate::access::Claims;
use crate::api::Resource;
use crate::error::Result;

/// Show the current claims and which resources they open
pub async fn cmd_whoami(json: bool) -> Result<()> {
    let ctx = AppContext::load()?;
    let claims = ctx.claims().await?;
    let (json_output, text) = describe(&claims, ctx.api.base_url().as_str());
    CommandOutput::new(json_output).with_text(text).print(json)
}

fn describe(claims: &Claims, base_url: &str) -> (serde_json::Value, String) {
    let resources: Vec<(Resource, bool)> = Resource::ALL
        .iter()
        .map(|r| (*r, claims.allows(&r.gate())))
        .collect();

    let json_output = json!({
        "base_url": base_url,
        "claims": claims,
        "resources": resources
            .iter()
            .map(|(r, allowed)| json!({"resource": r.to_string(), "allowed": allowed}))
            .collect::<Vec<_>>(),
    });

    let mut text = String::new();
    let username = claims.username.as_deref().unwrap_or("(anonymous)");
    text.push_str(&format!("{} {}", username.cyan().bold(), format!("@ {}", base_url).dimmed()));
    if claims.from_config {
        text.push_str(&format!(" {}", "(from config)".yellow()));
    }
    text.push('\n');

    let join = |set: &std::collections::BTreeSet<String>| {
        if set.is_empty() {
            "-".to_string()
        } else {
            set.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    };
    text.push_str(&format!("{}: {}\n", "roles".cyan(), join(&claims.roles)));
    text.push_str(&format!("{}: {}\n\n", "permissions".cyan(), join(&claims.permissions)));

    for (resource, allowed) in &resources {
        let mark = if *allowed {
            "yes".green().to_string()
        } else {
            "no".red().to_string()
        };
        text.push_str(&format!("  {:<14} {}\n", resource.to_string(), mark));
    }

    (json_output, text.trim_end().to_string())
}
