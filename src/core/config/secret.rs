use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

const SECRET_FILE_NAME: &str = ".secret_key";

/// Returns the signing key persisted next to the manifest, generating one on first boot.
pub(super) fn load_or_create_secret_key() -> String {
    load_or_create_at(&secret_file_path())
}

fn load_or_create_at(path: &Path) -> String {
    if let Some(existing) = read_key(path) {
        return existing;
    }

    let new_key = generate_secret_key();

    match fs::OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;

                if let Err(err) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
                    tracing::warn!(
                        error = %err,
                        path = %path.display(),
                        "Failed to restrict secret key file permissions"
                    );
                }
            }

            if let Err(err) = file.write_all(new_key.as_bytes()) {
                tracing::warn!(error = %err, path = %path.display(), "Failed to persist secret key");
            }
            new_key
        }
        // Another process won the race; prefer its key so tokens stay valid.
        Err(err) if err.kind() == ErrorKind::AlreadyExists => read_key(path).unwrap_or(new_key),
        Err(err) => {
            tracing::warn!(
                error = %err,
                path = %path.display(),
                "Failed to create secret key file; using an ephemeral key"
            );
            new_key
        }
    }
}

fn read_key(path: &Path) -> Option<String> {
    let value = fs::read_to_string(path).ok()?;
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn generate_secret_key() -> String {
    let mut bytes = [0u8; 64];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn secret_file_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(SECRET_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_is_reused_on_next_load() {
        let path = std::env::temp_dir().join(format!("studyhall-secret-{}", uuid::Uuid::new_v4()));

        let first = load_or_create_at(&path);
        let second = load_or_create_at(&path);

        assert_eq!(first, second);
        assert!(first.len() >= 80);
        let _ = fs::remove_file(&path);
    }
}
