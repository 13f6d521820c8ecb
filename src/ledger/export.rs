use log::info;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::errors::Result;
use crate::ledger::WalletLedger;

pub const CSV_HEADER: [&str; 4] = ["Role", "Address", "BNB Balance", "Token Balance"];

impl WalletLedger {
    /// Writes the wallet table as CSV, main wallet first.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(CSV_HEADER)?;
        for wallet in self.main_wallet().into_iter().chain(self.sub_wallets()) {
            csv_writer.write_record([
                wallet.role.to_string(),
                wallet.address.clone(),
                format!("{:.6}", wallet.native_balance),
                format!("{}", wallet.token_balance),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(file)?;
        info!("Exported {} wallets to {}", self.len(), path.display());
        Ok(())
    }
}
