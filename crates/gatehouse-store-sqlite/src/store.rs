//! [`SqliteStore`] — the SQLite implementation of [`AccountStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use gatehouse_core::{
  account::{
    Account, AccountStatus, EXTERNAL_ACCOUNT_TYPE_ID, LoginPatch, NewAccount,
  },
  provider::Provider,
  session::{NewSession, Session},
  store::{AccountStore, CreateOutcome},
};

use crate::{
  Error, Result,
  encode::{RawAccount, encode_dt, encode_provider, encode_status, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Gatehouse account store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-row account SELECT with positional string parameters.
  async fn select_account(
    &self,
    sql: &'static str,
    params: Vec<String>,
  ) -> Result<Option<Account>> {
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(sql, rusqlite::params_from_iter(params), read_account)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }
}

fn read_account(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAccount> {
  Ok(RawAccount {
    account_id:        row.get(0)?,
    account_type_id:   row.get(1)?,
    name:              row.get(2)?,
    email:             row.get(3)?,
    avatar_url:        row.get(4)?,
    provider:          row.get(5)?,
    status:            row.get(6)?,
    email_verified_at: row.get(7)?,
    last_login_at:     row.get(8)?,
    created_at:        row.get(9)?,
    credential_secret: row.get(10)?,
  })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _)
      if err.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

// ─── AccountStore impl ───────────────────────────────────────────────────────

impl AccountStore for SqliteStore {
  type Error = Error;

  // ── Lookups ───────────────────────────────────────────────────────────────

  async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
    self
      .select_account(
        "SELECT account_id, account_type_id, name, email, avatar_url,
                provider, status, email_verified_at, last_login_at,
                created_at, credential_secret
         FROM accounts WHERE email = ?1",
        vec![email.to_owned()],
      )
      .await
  }

  async fn find_by_identity(
    &self,
    provider: Provider,
    subject_id: &str,
  ) -> Result<Option<Account>> {
    self
      .select_account(
        "SELECT a.account_id, a.account_type_id, a.name, a.email, a.avatar_url,
                a.provider, a.status, a.email_verified_at, a.last_login_at,
                a.created_at, a.credential_secret
         FROM accounts a
         JOIN external_identities i ON i.account_id = a.account_id
         WHERE i.provider = ?1 AND i.subject_id = ?2",
        vec![encode_provider(provider).to_owned(), subject_id.to_owned()],
      )
      .await
  }

  async fn get_account(&self, account_id: Uuid) -> Result<Option<Account>> {
    self
      .select_account(
        "SELECT account_id, account_type_id, name, email, avatar_url,
                provider, status, email_verified_at, last_login_at,
                created_at, credential_secret
         FROM accounts WHERE account_id = ?1",
        vec![encode_uuid(account_id)],
      )
      .await
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn create_account(&self, new: NewAccount) -> Result<CreateOutcome> {
    let account = Account {
      account_id:        Uuid::new_v4(),
      account_type_id:   EXTERNAL_ACCOUNT_TYPE_ID,
      name:              new.name,
      email:             new.email,
      avatar_url:        new.avatar_url,
      provider:          new.provider,
      status:            AccountStatus::Active,
      email_verified_at: new.email_verified_at,
      last_login_at:     new.last_login_at,
      created_at:        Utc::now(),
      credential_secret: new.credential_secret,
    };

    let id_str       = encode_uuid(account.account_id);
    let type_id      = account.account_type_id;
    let name         = account.name.clone();
    let email        = account.email.clone();
    let avatar_url   = account.avatar_url.clone();
    let provider_str = encode_provider(account.provider).to_owned();
    let status_str   = encode_status(account.status).to_owned();
    let verified_str = account.email_verified_at.map(encode_dt);
    let login_str    = encode_dt(account.last_login_at);
    let created_str  = encode_dt(account.created_at);
    let secret       = account.credential_secret.clone();
    let subject_id   = new.subject_id;

    let created: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let inserted = tx.execute(
          "INSERT INTO accounts (
             account_id, account_type_id, name, email, avatar_url,
             provider, status, email_verified_at, last_login_at,
             created_at, credential_secret
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            type_id,
            name,
            email,
            avatar_url,
            provider_str,
            status_str,
            verified_str,
            login_str,
            created_str,
            secret,
          ],
        );
        match inserted {
          Ok(_) => {}
          // A concurrent first login won the email uniqueness race.
          Err(e) if is_unique_violation(&e) => return Ok(false),
          Err(e) => return Err(e.into()),
        }

        let linked = tx.execute(
          "INSERT INTO external_identities (provider, subject_id, account_id, linked_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![provider_str, subject_id, id_str, login_str],
        );
        match linked {
          Ok(_) => {}
          // The identity pair raced instead; dropping the uncommitted
          // transaction rolls back the account insert.
          Err(e) if is_unique_violation(&e) => return Ok(false),
          Err(e) => return Err(e.into()),
        }

        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(if created {
      CreateOutcome::Created(account)
    } else {
      CreateOutcome::Conflict
    })
  }

  async fn apply_login(
    &self,
    account_id: Uuid,
    patch: LoginPatch,
  ) -> Result<Account> {
    let id_str       = encode_uuid(account_id);
    let name         = patch.name;
    let email        = patch.email;
    let avatar_url   = patch.avatar_url;
    let provider_str = encode_provider(patch.provider).to_owned();
    let verified_str = patch.email_verified_at.map(encode_dt);
    let login_str    = encode_dt(patch.last_login_at);

    let updated: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE accounts
           SET name = ?2, email = ?3, avatar_url = ?4, provider = ?5,
               email_verified_at = ?6, last_login_at = ?7
           WHERE account_id = ?1",
          rusqlite::params![
            id_str,
            name,
            email,
            avatar_url,
            provider_str,
            verified_str,
            login_str,
          ],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::AccountNotFound(account_id));
    }

    self
      .get_account(account_id)
      .await?
      .ok_or(Error::AccountNotFound(account_id))
  }

  async fn link_identity(
    &self,
    account_id: Uuid,
    provider: Provider,
    subject_id: &str,
  ) -> Result<()> {
    let id_str       = encode_uuid(account_id);
    let provider_str = encode_provider(provider).to_owned();
    let subject      = subject_id.to_owned();
    let at_str       = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO external_identities (provider, subject_id, account_id, linked_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![provider_str, subject, id_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn insert_session(&self, session: NewSession) -> Result<Session> {
    let session = Session {
      session_id: Uuid::new_v4(),
      account_id: session.account_id,
      token_hash: session.token_hash,
      issued_at:  session.issued_at,
    };

    let id_str      = encode_uuid(session.session_id);
    let account_str = encode_uuid(session.account_id);
    let hash        = session.token_hash.clone();
    let at_str      = encode_dt(session.issued_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (session_id, account_id, token_hash, issued_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, account_str, hash, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(session)
  }

  async fn find_account_by_session(
    &self,
    token_hash: &str,
  ) -> Result<Option<Account>> {
    self
      .select_account(
        "SELECT a.account_id, a.account_type_id, a.name, a.email, a.avatar_url,
                a.provider, a.status, a.email_verified_at, a.last_login_at,
                a.created_at, a.credential_secret
         FROM accounts a
         JOIN sessions s ON s.account_id = a.account_id
         WHERE s.token_hash = ?1",
        vec![token_hash.to_owned()],
      )
      .await
  }
}
