use anyhow::{anyhow, bail, Context, Result};
use pressroom::schema::Category;
use pressroom::secrets::{EncryptionKey, SecretCodec};
use pressroom::settings::kind_for;
use serde_json::Value;
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use zeroize::Zeroizing;

pub fn keygen() -> Result<()> {
    let key = EncryptionKey::generate();
    println!("{}", key.to_hex().as_str());
    eprintln!("Set it as encryption.key or PRESSROOM_ENCRYPTION__KEY. Losing it loses every stored secret.");
    Ok(())
}

pub fn encrypt(key: &str, plaintext: Option<String>) -> Result<()> {
    let codec = codec(key)?;
    let plaintext = match plaintext {
        Some(p) => Zeroizing::new(p),
        None => read_stdin_line()?,
    };
    println!("{}", codec.encrypt(&plaintext)?);
    Ok(())
}

pub fn decrypt(key: &str, token: &str) -> Result<()> {
    let plaintext = Zeroizing::new(codec(key)?.decrypt(token)?);
    println!("{}", plaintext.as_str());
    Ok(())
}

pub fn validate(category: &str, file: &Path) -> Result<()> {
    let category = parse_category(category)?;
    let data = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let raw: Value =
        serde_json::from_str(&data).with_context(|| format!("parsing {}", file.display()))?;

    match check(category, &raw) {
        Ok(()) => {
            println!("{}: valid", category);
            Ok(())
        }
        Err(lines) => {
            for line in &lines {
                println!("{}", line);
            }
            bail!("{} field error(s) in {}", lines.len(), file.display())
        }
    }
}

pub fn categories() -> Result<()> {
    println!("{:<12} {:<10} {:<7} SENSITIVE", "CATEGORY", "KIND", "PUBLIC");
    for category in Category::ALL {
        println!(
            "{:<12} {:<10} {:<7} {}",
            category.key(),
            kind_for(category).as_str(),
            if category.is_public() { "yes" } else { "no" },
            category.sensitive_fields().join(", ")
        );
    }
    Ok(())
}

fn codec(key: &str) -> Result<SecretCodec> {
    SecretCodec::from_hex(key).map_err(|e| anyhow!("invalid encryption key: {}", e))
}

fn parse_category(key: &str) -> Result<Category> {
    Category::from_key(key).ok_or_else(|| {
        let known: Vec<&str> = Category::ALL.iter().map(|c| c.key()).collect();
        anyhow!("unknown category '{}'; expected one of: {}", key, known.join(", "))
    })
}

/// One `field: message` line per error.
fn check(category: Category, raw: &Value) -> std::result::Result<(), Vec<String>> {
    category.validate(raw).map(|_| ()).map_err(|errors| {
        errors
            .fields()
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect()
    })
}

fn read_stdin_line() -> Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(line)
}
