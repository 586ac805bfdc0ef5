//! Interactive plugin scaffold generator
//!
//! Writes `plugins/<name>/manifest.json` with one command bound to a handler
//! method, and validates it the same way the bot does on startup.
//!
//! Usage: cargo run --features scaffold --bin new-plugin

use camelbot::plugins::manifest::{CommandManifest, Interface, PluginManifest, MANIFEST_FILE};
use dialoguer::{Confirm, Input};
use std::path::Path;

fn validate_name(input: &String) -> Result<(), String> {
    if input.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if input.len() > 32 {
        return Err("Name must be 32 characters or less".to_string());
    }
    if !input
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err("Name must be lowercase letters, digits, '-' and '_' only".to_string());
    }
    Ok(())
}

fn validate_description(input: &String) -> Result<(), String> {
    if input.is_empty() {
        return Err("Description cannot be empty".to_string());
    }
    if input.chars().count() > 100 {
        return Err("Description must be 100 characters or less".to_string());
    }
    Ok(())
}

fn main() {
    println!("Plugin Scaffold Generator");
    println!("=========================\n");

    // 1. Plugin name
    let name: String = Input::new()
        .with_prompt("Plugin name (lowercase, max 32 chars)")
        .validate_with(validate_name)
        .interact_text()
        .expect("Failed to read input");

    let plugin_dir = Path::new("plugins").join(&name);
    let manifest_path = plugin_dir.join(MANIFEST_FILE);
    if manifest_path.exists() {
        eprintln!("Error: {} already exists", manifest_path.display());
        std::process::exit(1);
    }

    // 2. Description
    let description: String = Input::new()
        .with_prompt("Plugin description (max 100 chars)")
        .validate_with(validate_description)
        .interact_text()
        .expect("Failed to read input");

    // 3. Handler class compiled into the bot
    let class: String = Input::new()
        .with_prompt("Handler class")
        .default(name.clone())
        .interact_text()
        .expect("Failed to read input");

    // 4. First command
    let command: String = Input::new()
        .with_prompt("Command name")
        .default(name.clone())
        .validate_with(validate_name)
        .interact_text()
        .expect("Failed to read input");
    let method: String = Input::new()
        .with_prompt("Handler method")
        .default(command.clone())
        .interact_text()
        .expect("Failed to read input");
    let minecraft = Confirm::new()
        .with_prompt("Also expose the command on the Minecraft bridge?")
        .default(false)
        .interact()
        .expect("Failed to read input");

    let mut source = vec![Interface::Discord];
    if minecraft {
        source.push(Interface::Minecraft);
    }

    let manifest = PluginManifest {
        name: name.clone(),
        description: description.clone(),
        class,
        commands: vec![CommandManifest {
            name: command,
            description,
            class: None,
            method,
            options: Vec::new(),
            source,
        }],
    };

    // 5. Validate
    if let Err(e) = manifest.validate() {
        eprintln!("Generated manifest is invalid: {}", e);
        std::process::exit(1);
    }
    let json = serde_json::to_string_pretty(&manifest).expect("Failed to serialize manifest");
    println!("\nValidation passed:");
    println!("  Name: {}", manifest.name);
    for cmd in &manifest.commands {
        println!("  Command: /{} -> {}.{}", cmd.name, manifest.class, cmd.method);
    }

    // 6. Write file
    std::fs::create_dir_all(&plugin_dir).expect("Failed to create plugin directory");
    std::fs::write(&manifest_path, json + "\n").expect("Failed to write manifest");
    println!("\nCreated: {}", manifest_path.display());
    println!("Register the handler class in HandlerTable, then restart the bot to load it.");
}
