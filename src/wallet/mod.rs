use crate::errors::{Result, SniperError};
use crate::models::wallet::{WalletEntry, WalletKeys, WalletRole};
use crate::utils::{is_valid_address, normalize_address};
use log::{info, warn};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Resolves the wallets file path: explicit argument first, then the configured one.
pub fn get_wallets_path(path_arg: Option<&str>, configured: &str) -> PathBuf {
    match path_arg {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ if !configured.trim().is_empty() => PathBuf::from(configured),
        _ => PathBuf::from("./wallets.json"),
    }
}

/// Loads the wallet set. Accepts both `{"wallets": [...]}` and a bare array.
/// A missing file is an empty set.
pub fn load_wallets_from_file(path: &Path) -> Result<WalletKeys> {
    if !path.exists() {
        warn!("Wallets file '{}' not found; starting with an empty wallet set.", path.display());
        return Ok(WalletKeys { wallets: Vec::new() });
    }
    let content = fs::read_to_string(path)
        .map_err(|e| SniperError::Wallet(format!("Failed to read wallets file '{}': {}", path.display(), e)))?;

    let keys = match serde_json::from_str::<WalletKeys>(&content) {
        Ok(keys) => keys,
        Err(e) => {
            warn!("Failed to parse '{}' as {{\"wallets\": [...]}}: {}. Trying bare array format...", path.display(), e);
            let wallets = serde_json::from_str::<Vec<WalletEntry>>(&content).map_err(|e2| {
                SniperError::Wallet(format!(
                    "Failed to parse wallets file '{}'. Error 1: {}. Error 2: {}",
                    path.display(),
                    e,
                    e2
                ))
            })?;
            WalletKeys { wallets }
        }
    };

    for entry in &keys.wallets {
        if !is_valid_address(&entry.address) {
            return Err(SniperError::InvalidAddress(format!("{} (in {})", entry.address, path.display())));
        }
    }
    info!("Loaded {} wallets from {}", keys.wallets.len(), path.display());
    Ok(keys)
}

pub fn save_wallets_to_file(keys: &WalletKeys, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json_data = serde_json::to_string_pretty(keys)?;
    let mut file = File::create(path)
        .map_err(|e| SniperError::Wallet(format!("Failed to create wallets file '{}': {}", path.display(), e)))?;
    file.write_all(json_data.as_bytes())?;
    info!("Saved {} wallets to {}", keys.wallets.len(), path.display());
    Ok(())
}

impl WalletKeys {
    fn position(&self, address: &str) -> Option<usize> {
        self.wallets.iter().position(|w| w.address.eq_ignore_ascii_case(address.trim()))
    }

    pub fn main_wallet(&self) -> Option<&WalletEntry> {
        self.wallets.iter().find(|w| w.role == WalletRole::Main)
    }

    /// Adds a wallet. Adding a second main wallet demotes the old one.
    pub fn add_wallet(&mut self, address: &str, role: WalletRole, name: Option<String>) -> Result<()> {
        let address = normalize_address(address)?;
        if self.position(&address).is_some() {
            return Err(SniperError::Wallet(format!("Wallet {} already exists", address)));
        }
        if role == WalletRole::Main {
            self.demote_main();
        }
        self.wallets.push(WalletEntry { address, role, name });
        Ok(())
    }

    pub fn remove_wallet(&mut self, address: &str) -> Result<WalletEntry> {
        let index = self
            .position(address)
            .ok_or_else(|| SniperError::Wallet(format!("Unknown wallet: {}", address)))?;
        Ok(self.wallets.remove(index))
    }

    /// Makes `address` the main wallet; the previous main becomes a sniping wallet.
    pub fn set_main_wallet(&mut self, address: &str) -> Result<()> {
        let index = self
            .position(address)
            .ok_or_else(|| SniperError::Wallet(format!("Unknown wallet: {}", address)))?;
        self.demote_main();
        self.wallets[index].role = WalletRole::Main;
        Ok(())
    }

    fn demote_main(&mut self) {
        for wallet in self.wallets.iter_mut().filter(|w| w.role == WalletRole::Main) {
            wallet.role = WalletRole::Sub;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: &str = "0x1111111111111111111111111111111111111111";
    const SUB: &str = "0x2222222222222222222222222222222222222222";

    #[test]
    fn missing_file_is_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let keys = load_wallets_from_file(&dir.path().join("nope.json")).unwrap();
        assert!(keys.wallets.is_empty());
    }

    #[test]
    fn saves_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("wallets.json");
        let mut keys = WalletKeys { wallets: Vec::new() };
        keys.add_wallet(MAIN, WalletRole::Main, Some("deposit".to_string())).unwrap();
        keys.add_wallet(SUB, WalletRole::Sub, None).unwrap();
        save_wallets_to_file(&keys, &path).unwrap();

        let loaded = load_wallets_from_file(&path).unwrap();
        assert_eq!(loaded.wallets.len(), 2);
        assert_eq!(loaded.main_wallet().unwrap().address, MAIN);
    }

    #[test]
    fn reads_bare_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        fs::write(&path, format!(r#"[{{"address": "{}", "role": "main"}}]"#, MAIN)).unwrap();
        let keys = load_wallets_from_file(&path).unwrap();
        assert_eq!(keys.wallets[0].role, WalletRole::Main);
    }

    #[test]
    fn rejects_bad_address_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        fs::write(&path, r#"{"wallets": [{"address": "0x12", "role": "sub"}]}"#).unwrap();
        assert!(load_wallets_from_file(&path).is_err());
    }

    #[test]
    fn set_main_demotes_previous() {
        let mut keys = WalletKeys { wallets: Vec::new() };
        keys.add_wallet(MAIN, WalletRole::Main, None).unwrap();
        keys.add_wallet(SUB, WalletRole::Sub, None).unwrap();
        keys.set_main_wallet(SUB).unwrap();
        assert_eq!(keys.main_wallet().unwrap().address, SUB);
        assert_eq!(keys.wallets.iter().filter(|w| w.role == WalletRole::Main).count(), 1);
        assert!(keys.add_wallet(&SUB.to_uppercase().replacen("0X", "0x", 1), WalletRole::Sub, None).is_err());
        keys.remove_wallet(MAIN).unwrap();
        assert_eq!(keys.wallets.len(), 1);
    }
}
