//! Translate a short text and print the result.
//!
//! Reads credentials from `LARA_ACCESS_KEY_ID` / `LARA_ACCESS_KEY_SECRET`.

use lara::{Credentials, TranslateOptions, Translator};

#[tokio::main]
async fn main() -> lara::Result<()> {
    let credentials = Credentials::from_env()?;
    let lara = Translator::new(credentials)?;

    let result = lara
        .translate(
            "Hello, world!",
            Some("en-US"),
            "fr-FR",
            TranslateOptions::default(),
        )
        .await?;

    println!("Detected source: {}", result.source_language);
    println!("Translation: {:?}", result.translation);

    Ok(())
}
