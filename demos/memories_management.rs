//! Create a translation memory, teach it one pair, and clean up.
//!
//! Reads credentials from `LARA_ACCESS_KEY_ID` / `LARA_ACCESS_KEY_SECRET`.

use lara::{Credentials, TranslationUnit, Translator};

#[tokio::main]
async fn main() -> lara::Result<()> {
    let credentials = Credentials::from_env()?;
    let lara = Translator::new(credentials)?;

    let memory = lara.memories.create("Product glossary demo", None).await?;
    println!("Created memory {}", memory.id);

    let unit = TranslationUnit::new("en-US", "fr-FR", "Hello", "Bonjour").with_tuid("greeting-1");
    let import = lara.memories.add_translation(&memory.id, &unit).await?;

    let mut on_progress = |current: &lara::MemoryImport| {
        println!("Import progress: {:.0}%", current.progress * 100.0);
    };
    lara.memories
        .wait_for_import(import, Some(&mut on_progress), None)
        .await?;

    for found in lara.memories.list().await? {
        println!("Memory: {} ({})", found.name, found.id);
    }

    lara.memories.delete(&memory.id).await?;
    println!("Deleted memory {}", memory.id);

    Ok(())
}
