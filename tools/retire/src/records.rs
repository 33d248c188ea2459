//! JSON ledger of every transaction record a CLI run produced.

use std::{
    ffi::OsString,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use alloy_primitives::Address;
use anyhow::{Context, Result};
use carbon_retirement::types::{NetworkProfile, TransactionRecord};
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Records observed during one run, latest status per hash.
#[derive(Debug, Default)]
pub struct RunRecords {
    records: Vec<TransactionRecord>,
}

impl RunRecords {
    pub fn observe(&mut self, record: &TransactionRecord) {
        match self.records.iter_mut().find(|r| r.hash == record.hash) {
            Some(existing) => *existing = record.clone(),
            None => self.records.push(record.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Append `run` to the ledger at `path`, creating it if needed.
pub fn append_records(
    path: &Path,
    network: &NetworkProfile,
    signer: Address,
    run: &RunRecords,
) -> Result<()> {
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let existing = if path.exists() {
        fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?
    } else {
        String::new()
    };

    let mut root: Value = if existing.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str(&existing)
            .with_context(|| format!("failed parsing JSON in {}", path.display()))?
    };

    if !root.is_object() {
        root = json!({});
    }

    root["network"] = json!(network.name);
    root["chain_id"] = json!(network.chain_id);
    root["updated_at"] = json!(now);

    if root.get("records").and_then(Value::as_array).is_none() {
        root["records"] = json!([]);
    }

    for record in &run.records {
        let mut entry = serde_json::to_value(record).context("failed serialising record")?;
        entry["network"] = json!(network.name);
        entry["chain_id"] = json!(network.chain_id);
        entry["signer"] = json!(signer);
        entry["recorded_at"] = json!(now);
        if let Some(records) = root["records"].as_array_mut() {
            records.push(entry);
        }
    }

    write_ledger(path, &root)
}

/// Replace the ledger through a sibling staging file so readers never see a partial write.
fn write_ledger(path: &Path, ledger: &Value) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create ledger directory {}", dir.display()))?;
    }

    let staging = staging_path(path);
    let file = File::create(&staging)
        .with_context(|| format!("cannot create staging file {}", staging.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, ledger).context("cannot encode retirement ledger")?;
    writer
        .flush()
        .with_context(|| format!("cannot flush staging file {}", staging.display()))?;
    fs::rename(&staging, path)
        .with_context(|| format!("cannot move ledger into place at {}", path.display()))?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;
    use carbon_retirement::{
        types::{TxStage, TxStatus},
        NetworkRegistry,
    };

    fn temp_ledger(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "carbon-retire-{}-{}-{}.json",
            name,
            std::process::id(),
            OffsetDateTime::now_utc().unix_timestamp_nanos()
        ))
    }

    #[test]
    fn test_observe_keeps_latest_status_per_hash() {
        let mut run = RunRecords::default();
        let mut record = TransactionRecord::pending(B256::repeat_byte(1), TxStage::Approval);
        run.observe(&record);
        record.confirm(Some(10));
        run.observe(&record);

        assert_eq!(run.records.len(), 1);
        assert_eq!(run.records[0].status, TxStatus::Confirmed);
    }

    #[test]
    fn test_append_records_accumulates_across_runs() {
        let path = temp_ledger("append");
        let registry = NetworkRegistry::builtin().unwrap();
        let celo = registry.profile("celo").unwrap();

        for byte in [1u8, 2u8] {
            let mut run = RunRecords::default();
            let mut record =
                TransactionRecord::pending(B256::repeat_byte(byte), TxStage::Retirement);
            record.confirm(Some(byte as u64));
            run.observe(&record);
            append_records(&path, celo, Address::repeat_byte(0xaa), &run).unwrap();
        }

        let root: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(root["network"], "celo");
        assert_eq!(root["chain_id"], 42220);
        let records = root["records"].as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["status"], "confirmed");
        assert_eq!(records[1]["stage"], "retirement");
        assert!(!staging_path(&path).exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_each_entry_keeps_its_network() {
        let path = temp_ledger("networks");
        let registry = NetworkRegistry::builtin().unwrap();
        let celo = registry.profile("celo").unwrap().clone();
        let mut other = celo.clone();
        other.name = "alfajores".to_string();
        other.chain_id = 44787;

        for (byte, network) in [(1u8, &celo), (2u8, &other)] {
            let mut run = RunRecords::default();
            run.observe(&TransactionRecord::pending(B256::repeat_byte(byte), TxStage::Approval));
            append_records(&path, network, Address::repeat_byte(0xaa), &run).unwrap();
        }

        let root: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let records = root["records"].as_array().unwrap();
        assert_eq!(records[0]["network"], "celo");
        assert_eq!(records[0]["chain_id"], 42220);
        assert_eq!(records[1]["network"], "alfajores");
        assert_eq!(records[1]["chain_id"], 44787);
        assert_eq!(root["network"], "alfajores");

        let _ = fs::remove_file(&path);
    }
}
