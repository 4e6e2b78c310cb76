//! Multi-account note replica registry.
//!
//! Two lock levels: `accounts` guards membership (insert and lookup) and each
//! account carries its own lock for content. The membership lock is released
//! before an account lock is awaited, so traffic on one account never waits
//! behind another.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use biji_core::store::{read_json, write_json_atomic, Layout};
use biji_core::sync::{reconcile, validate_incoming, SyncResponse};
use biji_core::{Error, Note, Result};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::account::Account;
use crate::sync_code::{generate_sync_code, is_well_formed};

type AccountSlot = Arc<RwLock<Account>>;
type CodeGenerator = Arc<dyn Fn() -> String + Send + Sync>;

pub struct SyncRegistry {
    data_dir: PathBuf,
    accounts: RwLock<HashMap<String, AccountSlot>>,
    max_attempts: u32,
    generate_code: CodeGenerator,
}

impl SyncRegistry {
    /// Open the registry rooted at `data_dir`, loading every account document in it
    pub fn open(data_dir: impl Into<PathBuf>, max_attempts: u32) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;

        let accounts = load_accounts(&data_dir)?;
        tracing::info!(
            data_dir = %data_dir.display(),
            accounts = accounts.len(),
            "Loaded sync accounts"
        );

        Ok(Self {
            data_dir,
            accounts: RwLock::new(accounts),
            max_attempts: max_attempts.max(1),
            generate_code: Arc::new(generate_sync_code),
        })
    }

    #[cfg(test)]
    fn with_code_generator(
        mut self,
        generate: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.generate_code = Arc::new(generate);
        self
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Create an empty account under a fresh sync code and return the code
    pub async fn register_account(&self) -> Result<String> {
        let (sync_code, slot) = self.claim_code().await?;

        let account = slot.write().await;
        if let Err(error) = self.persist(&account) {
            drop(account);
            self.accounts.write().await.remove(&sync_code);
            return Err(error);
        }

        tracing::info!(account = code_fingerprint(&sync_code), "Registered account");
        Ok(sync_code)
    }

    /// Snapshot of an account's notes
    pub async fn get_notes(&self, sync_code: &str) -> Result<Vec<Note>> {
        let slot = self.lookup(sync_code).await?;
        let account = slot.read().await;
        Ok(account.notes.clone())
    }

    /// Reconcile an uploaded note set into the account, last writer wins per note
    pub async fn sync(
        &self,
        sync_code: &str,
        notes: Vec<Note>,
        client_last_sync: Option<DateTime<Utc>>,
    ) -> Result<SyncResponse> {
        let slot = self.lookup(sync_code).await?;
        validate_incoming(&notes)?;
        let mut account = slot.write().await;

        let merged = reconcile(&account.notes, notes);
        let mut next = account.clone();
        next.notes = merged.notes;
        next.last_sync = Utc::now();
        self.persist(&next)?;
        *account = next;

        tracing::info!(
            account = code_fingerprint(&account.sync_code),
            added = merged.added,
            accepted = merged.accepted,
            retained = merged.retained,
            client_last_sync = ?client_last_sync,
            "Synced account"
        );

        Ok(SyncResponse {
            notes: account.notes.clone(),
            last_sync: account.last_sync,
        })
    }

    async fn claim_code(&self) -> Result<(String, AccountSlot)> {
        let mut accounts = self.accounts.write().await;
        for attempt in 1..=self.max_attempts {
            let candidate = (self.generate_code)();
            if accounts.contains_key(&candidate) {
                tracing::warn!(attempt, "Sync code collision, retrying");
                continue;
            }

            let slot = Arc::new(RwLock::new(Account::new(candidate.clone())));
            accounts.insert(candidate.clone(), Arc::clone(&slot));
            return Ok((candidate, slot));
        }

        Err(Error::RegistrationExhausted {
            attempts: self.max_attempts,
        })
    }

    async fn lookup(&self, sync_code: &str) -> Result<AccountSlot> {
        let sync_code = sync_code.trim();
        if sync_code.is_empty() {
            return Err(Error::Unauthorized);
        }

        self.accounts
            .read()
            .await
            .get(sync_code)
            .cloned()
            .ok_or_else(|| Error::NotFound("sync code is not registered".to_string()))
    }

    // Blocking write on the runtime thread, under the account's lock. Documents
    // are small and only this account's callers wait on it.
    fn persist(&self, account: &Account) -> Result<()> {
        let path = self
            .data_dir
            .join(Account::document_name(&account.sync_code));
        write_json_atomic(&path, account, Layout::Pretty)
    }
}

fn load_accounts(data_dir: &Path) -> Result<HashMap<String, AccountSlot>> {
    let mut accounts = HashMap::new();

    for entry in fs::read_dir(data_dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };

        let account = match read_json::<Account>(&path) {
            Ok(account) => account,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "Skipping unreadable account document");
                continue;
            }
        };
        if account.sync_code != stem {
            tracing::warn!(path = %path.display(), "Skipping account document with mismatched sync code");
            continue;
        }
        if !is_well_formed(stem) {
            tracing::warn!(path = %path.display(), "Loaded account with a non-standard sync code");
        }

        accounts.insert(stem.to_string(), Arc::new(RwLock::new(account)));
    }

    Ok(accounts)
}

/// Stable, non-reversible tag for a sync code in logs
pub fn code_fingerprint(sync_code: &str) -> u64 {
    use std::hash::{Hash, Hasher};

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    sync_code.hash(&mut hasher);
    hasher.finish()
}
