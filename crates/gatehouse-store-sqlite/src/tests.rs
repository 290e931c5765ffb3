//! Integration tests for `SqliteStore` against an in-memory database,
//! driving the full reconciliation engine.

use gatehouse_core::{
  account::{EXTERNAL_ACCOUNT_TYPE_ID, AccountStatus, NewAccount},
  assertion::IdentityAssertion,
  provider::Provider,
  reconcile::reconcile,
  session::{self, NewSession},
  store::{AccountStore, CreateOutcome},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn count_accounts(s: &SqliteStore) -> i64 {
  s.conn
    .call(|conn| {
      Ok(conn.query_row("SELECT COUNT(*) FROM accounts", [], |r| r.get(0))?)
    })
    .await
    .unwrap()
}

fn google_assertion(subject_id: &str, email: Option<&str>) -> IdentityAssertion {
  IdentityAssertion {
    provider:       Provider::Google,
    subject_id:     subject_id.to_string(),
    email:          email.map(str::to_string),
    display_name:   Some("Alice Liddell".to_string()),
    avatar_url:     Some("https://pic.example/alice.png".to_string()),
    email_verified: email.is_some(),
  }
}

fn facebook_assertion(subject_id: &str, email: Option<&str>) -> IdentityAssertion {
  IdentityAssertion {
    provider:       Provider::Facebook,
    subject_id:     subject_id.to_string(),
    email:          email.map(str::to_string),
    display_name:   Some("A. Liddell".to_string()),
    avatar_url:     None,
    email_verified: false,
  }
}

// ─── Create path ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_login_creates_account() {
  let s = store().await;

  let account = reconcile(&s, &google_assertion("abc123", Some("u@x.com")))
    .await
    .unwrap();

  assert_eq!(account.account_type_id, EXTERNAL_ACCOUNT_TYPE_ID);
  assert_eq!(account.name, "Alice Liddell");
  assert_eq!(account.email.as_deref(), Some("u@x.com"));
  assert_eq!(account.provider, Provider::Google);
  assert_eq!(account.status, AccountStatus::Active);
  assert!(account.email_verified_at.is_some());
  assert!(!account.credential_secret.is_empty());
  assert_eq!(count_accounts(&s).await, 1);
}

#[tokio::test]
async fn create_without_name_uses_placeholder() {
  let s = store().await;
  let mut assertion = google_assertion("abc123xyz", Some("u@x.com"));
  assertion.display_name = None;

  let account = reconcile(&s, &assertion).await.unwrap();
  assert_eq!(account.name, "User abc123");
}

#[tokio::test]
async fn unverified_create_leaves_verification_unset() {
  let s = store().await;
  let account = reconcile(&s, &facebook_assertion("zzz999", Some("u@x.com")))
    .await
    .unwrap();
  assert!(account.email_verified_at.is_none());
}

// ─── Update path ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn repeat_login_is_idempotent() {
  let s = store().await;
  let assertion = google_assertion("abc123", Some("u@x.com"));

  let first = reconcile(&s, &assertion).await.unwrap();
  let second = reconcile(&s, &assertion).await.unwrap();

  assert_eq!(first.account_id, second.account_id);
  assert_eq!(first.name, second.name);
  assert_eq!(first.email, second.email);
  assert_eq!(first.email_verified_at, second.email_verified_at);
  assert!(second.last_login_at >= first.last_login_at);
  assert_eq!(count_accounts(&s).await, 1);
}

#[tokio::test]
async fn existing_name_is_never_overwritten() {
  let s = store().await;
  let first = reconcile(&s, &google_assertion("abc123", Some("u@x.com")))
    .await
    .unwrap();

  let mut renamed = google_assertion("abc123", Some("u@x.com"));
  renamed.display_name = Some("Completely Different".to_string());
  let second = reconcile(&s, &renamed).await.unwrap();

  assert_eq!(second.account_id, first.account_id);
  assert_eq!(second.name, "Alice Liddell");
}

#[tokio::test]
async fn cross_provider_logins_merge_by_email() {
  let s = store().await;

  let google = reconcile(&s, &google_assertion("abc123", Some("u@x.com")))
    .await
    .unwrap();
  let facebook = reconcile(&s, &facebook_assertion("zzz999", Some("u@x.com")))
    .await
    .unwrap();

  assert_eq!(google.account_id, facebook.account_id);
  assert_eq!(facebook.provider, Provider::Facebook);
  assert_eq!(facebook.email.as_deref(), Some("u@x.com"));
  // Verification set by the first provider survives the unverified login.
  assert_eq!(facebook.email_verified_at, google.email_verified_at);
  assert!(facebook.email_verified_at.is_some());
  assert_eq!(count_accounts(&s).await, 1);
}

#[tokio::test]
async fn subject_id_is_fallback_when_email_absent() {
  let s = store().await;

  let first = reconcile(&s, &facebook_assertion("zzz999", None))
    .await
    .unwrap();
  let second = reconcile(&s, &facebook_assertion("zzz999", None))
    .await
    .unwrap();

  assert_eq!(first.account_id, second.account_id);
  assert_eq!(count_accounts(&s).await, 1);
}

#[tokio::test]
async fn identity_pairs_accumulate_across_providers() {
  let s = store().await;

  // Google first, then Facebook on the same email links a second pair.
  let original = reconcile(&s, &google_assertion("abc123", Some("u@x.com")))
    .await
    .unwrap();
  reconcile(&s, &facebook_assertion("zzz999", Some("u@x.com")))
    .await
    .unwrap();

  // A later Google login that carries no email still finds the account
  // through the retained (google, abc123) pair.
  let back = reconcile(&s, &google_assertion("abc123", None)).await.unwrap();
  assert_eq!(back.account_id, original.account_id);
  assert_eq!(count_accounts(&s).await, 1);
}

#[tokio::test]
async fn update_fills_empty_avatar_only() {
  let s = store().await;
  let first = reconcile(&s, &facebook_assertion("zzz999", Some("u@x.com")))
    .await
    .unwrap();
  assert!(first.avatar_url.is_none());

  let filled = reconcile(&s, &google_assertion("abc123", Some("u@x.com")))
    .await
    .unwrap();
  assert_eq!(filled.avatar_url.as_deref(), Some("https://pic.example/alice.png"));

  let mut other_pic = google_assertion("abc123", Some("u@x.com"));
  other_pic.avatar_url = Some("https://pic.example/new.png".to_string());
  let kept = reconcile(&s, &other_pic).await.unwrap();
  assert_eq!(kept.avatar_url.as_deref(), Some("https://pic.example/alice.png"));
}

// ─── Creation races ──────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_email_create_reports_conflict() {
  let s = store().await;

  let new = |subject: &str| NewAccount {
    name:              "Alice".to_string(),
    email:             Some("u@x.com".to_string()),
    avatar_url:        None,
    provider:          Provider::Google,
    subject_id:        subject.to_string(),
    credential_secret: session::generate_secret(),
    email_verified_at: None,
    last_login_at:     chrono::Utc::now(),
  };

  assert!(matches!(
    s.create_account(new("abc123")).await.unwrap(),
    CreateOutcome::Created(_)
  ));
  assert!(matches!(
    s.create_account(new("def456")).await.unwrap(),
    CreateOutcome::Conflict
  ));
  assert_eq!(count_accounts(&s).await, 1);
}

#[tokio::test]
async fn duplicate_identity_create_reports_conflict_and_rolls_back() {
  let s = store().await;

  let new = |email: Option<&str>| NewAccount {
    name:              "Alice".to_string(),
    email:             email.map(str::to_string),
    avatar_url:        None,
    provider:          Provider::Facebook,
    subject_id:        "zzz999".to_string(),
    credential_secret: session::generate_secret(),
    email_verified_at: None,
    last_login_at:     chrono::Utc::now(),
  };

  assert!(matches!(
    s.create_account(new(None)).await.unwrap(),
    CreateOutcome::Created(_)
  ));
  // Different email, same identity pair: the pair constraint fires and the
  // second account row must not survive.
  assert!(matches!(
    s.create_account(new(Some("late@x.com"))).await.unwrap(),
    CreateOutcome::Conflict
  ));
  assert_eq!(count_accounts(&s).await, 1);
}

#[tokio::test]
async fn concurrent_first_logins_yield_one_account() {
  let s = store().await;
  let assertion = google_assertion("abc123", Some("u@x.com"));

  let (a, b) = tokio::join!(reconcile(&s, &assertion), reconcile(&s, &assertion));
  let a = a.unwrap();
  let b = b.unwrap();

  assert_eq!(a.account_id, b.account_id);
  assert_eq!(count_accounts(&s).await, 1);
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_resolves_to_its_account() {
  let s = store().await;
  let account = reconcile(&s, &google_assertion("abc123", Some("u@x.com")))
    .await
    .unwrap();

  let token = session::generate_secret();
  s.insert_session(NewSession {
    account_id: account.account_id,
    token_hash: session::token_hash(&token),
    issued_at:  chrono::Utc::now(),
  })
  .await
  .unwrap();

  let found = s
    .find_account_by_session(&session::token_hash(&token))
    .await
    .unwrap()
    .expect("session should resolve");
  assert_eq!(found.account_id, account.account_id);
}

#[tokio::test]
async fn unknown_session_hash_resolves_to_none() {
  let s = store().await;
  let found = s
    .find_account_by_session(&session::token_hash("nope"))
    .await
    .unwrap();
  assert!(found.is_none());
}

#[tokio::test]
async fn issuing_keeps_prior_sessions_valid() {
  let s = store().await;
  let account = reconcile(&s, &google_assertion("abc123", Some("u@x.com")))
    .await
    .unwrap();

  let (first, _) = session::issue(&s, &account).await.unwrap();
  let (second, _) = session::issue(&s, &account).await.unwrap();
  assert_ne!(first.0, second.0);

  for credential in [&first.0, &second.0] {
    let found = s
      .find_account_by_session(&session::token_hash(credential))
      .await
      .unwrap();
    assert!(found.is_some());
  }
}
