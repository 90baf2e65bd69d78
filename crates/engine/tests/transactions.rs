use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    AdminTransactionFilter, BankDetailsNew, Caller, Engine, EngineError, NewTransactionCmd,
    TransactionKind, TransactionStatus, TransactionUpdate, UserNew, UserTransactionFilter,
};
use migration::MigratorTrait;

struct Fixture {
    engine: Engine,
    _db: DatabaseConnection,
    alice: Caller,
    bob: Caller,
    admin: Caller,
    usd: i32,
    eur: i32,
    usd_bank: i32,
}

async fn user(engine: &Engine, name: &str, is_admin: bool) -> i32 {
    engine
        .new_user(UserNew {
            email: format!("{name}@example.com"),
            username: name.to_string(),
            password: "password".to_string(),
            is_admin,
        })
        .await
        .unwrap()
}

async fn fixture() -> Fixture {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    let alice = Caller::user(user(&engine, "alice", false).await);
    let bob = Caller::user(user(&engine, "bob", false).await);
    let admin = Caller::admin(user(&engine, "root", true).await);

    let usd = engine.fiat_currency_id(Some(&alice), "USD").await.unwrap();
    let eur = engine.fiat_currency_id(Some(&alice), "eur").await.unwrap();
    let usd_bank = engine
        .new_bank_details(BankDetailsNew {
            bank_name: "First Bank".to_string(),
            account_holder: "Exchange Ltd".to_string(),
            account_number: "000123".to_string(),
            bank_address: "1 Main St".to_string(),
            iban: "GB00FIRS000123".to_string(),
            swift_code: "FIRSGB22".to_string(),
            currencies: vec!["USD".to_string()],
        })
        .await
        .unwrap();

    Fixture {
        engine,
        _db: db,
        alice,
        bob,
        admin,
        usd,
        eur,
        usd_bank,
    }
}

fn buy(fiat_currency_id: i32, bank_details_id: i32, fiat_amount: i64) -> NewTransactionCmd {
    NewTransactionCmd {
        kind: TransactionKind::Buy,
        fiat_currency_id,
        crypto_currency: "USDT".to_string(),
        fiat_amount: Decimal::new(fiat_amount, 0),
        crypto_amount: None,
        rate: None,
        commission: None,
        wallet_address: "TQn9Y2khEsLJW1ChVWFMSMeRDow5KcbLSE".to_string(),
        bank_details_id,
    }
}

fn status(status: TransactionStatus) -> TransactionUpdate {
    TransactionUpdate {
        status: Some(status),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_starts_in_new_with_payment_instructions() {
    let f = fixture().await;

    let created = f
        .engine
        .create_transaction(Some(&f.alice), buy(f.usd, f.usd_bank, 250))
        .await
        .unwrap();

    let tx = &created.transaction;
    assert_eq!(tx.status, TransactionStatus::New);
    assert_eq!(tx.user_id, f.alice.user_id);
    assert_eq!(tx.fiat_amount, Decimal::new(250, 0));
    assert_eq!(tx.crypto_amount, Decimal::ZERO);
    assert!(tx.payment_id.starts_with("PAY-"));
    assert_eq!(tx.last_change_date, None);
    assert_eq!(tx.last_modified_by, None);
    assert_eq!(created.fiat_currency, "USD");
    assert_eq!(created.bank_details.id, f.usd_bank);
    assert_eq!(created.bank_details.iban, "GB00FIRS000123");
}

#[tokio::test]
async fn create_rejects_bank_details_in_another_currency() {
    let f = fixture().await;

    let err = f
        .engine
        .create_transaction(Some(&f.alice), buy(f.eur, f.usd_bank, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CurrencyMismatch(_)));

    let err = f
        .engine
        .create_transaction(Some(&f.alice), buy(9999, f.usd_bank, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = f
        .engine
        .create_transaction(None, buy(f.usd, f.usd_bank, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));
}

#[tokio::test]
async fn user_listing_pages_through_pending_transactions() {
    let f = fixture().await;

    for amount in 1..=15 {
        let created = f
            .engine
            .create_transaction(Some(&f.alice), buy(f.usd, f.usd_bank, amount))
            .await
            .unwrap();
        f.engine
            .edit_transaction(
                Some(&f.admin),
                created.transaction.id,
                status(TransactionStatus::Pending),
            )
            .await
            .unwrap();
    }
    // Noise that must not show up.
    f.engine
        .create_transaction(Some(&f.alice), buy(f.usd, f.usd_bank, 99))
        .await
        .unwrap();
    f.engine
        .create_transaction(Some(&f.bob), buy(f.usd, f.usd_bank, 99))
        .await
        .unwrap();

    let filter = UserTransactionFilter {
        user_id: f.alice.user_id,
        status: Some(TransactionStatus::Pending),
        ..Default::default()
    };

    let first = f
        .engine
        .list_user_transactions(Some(&f.alice), &filter, 0)
        .await
        .unwrap();
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.total_pages, 2);
    // Newest first.
    assert_eq!(first.items[0].transaction.fiat_amount, Decimal::new(15, 0));

    let second = f
        .engine
        .list_user_transactions(Some(&f.alice), &filter, 10)
        .await
        .unwrap();
    assert_eq!(second.items.len(), 5);
    assert_eq!(second.total_pages, 2);
    assert!(second.items.iter().all(|row| {
        row.transaction.status == TransactionStatus::Pending && row.fiat_currency == "USD"
    }));

    let beyond = f
        .engine
        .list_user_transactions(Some(&f.alice), &filter, 40)
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total_pages, 2);

    // Offsets SQLite cannot bind never reach the row query.
    let far = f
        .engine
        .list_user_transactions(Some(&f.alice), &filter, u64::MAX)
        .await
        .unwrap();
    assert!(far.items.is_empty());
    assert_eq!(far.total_pages, 2);

    let far = f
        .engine
        .list_admin_transactions(
            Some(&f.admin),
            &AdminTransactionFilter::default(),
            i64::MAX as u64 + 1,
        )
        .await
        .unwrap();
    assert!(far.items.is_empty());
    assert_eq!(far.total_pages, 2);
}

#[tokio::test]
async fn user_listing_filters_by_payment_id_and_kind() {
    let f = fixture().await;

    let created = f
        .engine
        .create_transaction(Some(&f.alice), buy(f.usd, f.usd_bank, 10))
        .await
        .unwrap();
    f.engine
        .create_transaction(
            Some(&f.alice),
            NewTransactionCmd {
                kind: TransactionKind::Sell,
                ..buy(f.usd, f.usd_bank, 20)
            },
        )
        .await
        .unwrap();

    let needle = created.transaction.payment_id[4..10].to_lowercase();
    let page = f
        .engine
        .list_user_transactions(
            Some(&f.alice),
            &UserTransactionFilter {
                user_id: f.alice.user_id,
                payment_id: Some(needle),
                ..Default::default()
            },
            0,
        )
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].transaction.id, created.transaction.id);

    let sells = f
        .engine
        .list_user_transactions(
            Some(&f.alice),
            &UserTransactionFilter {
                user_id: f.alice.user_id,
                kind: Some(TransactionKind::Sell),
                ..Default::default()
            },
            0,
        )
        .await
        .unwrap();
    assert_eq!(sells.items.len(), 1);
    assert_eq!(sells.items[0].transaction.kind, TransactionKind::Sell);

    let window = f
        .engine
        .list_user_transactions(
            Some(&f.alice),
            &UserTransactionFilter {
                user_id: f.alice.user_id,
                created_from: Some(Utc::now() + Duration::days(1)),
                ..Default::default()
            },
            0,
        )
        .await
        .unwrap();
    assert!(window.items.is_empty());
    assert_eq!(window.total_pages, 0);
}

#[tokio::test]
async fn user_listing_is_scoped_to_the_caller() {
    let f = fixture().await;
    let filter = UserTransactionFilter {
        user_id: f.alice.user_id,
        ..Default::default()
    };

    let err = f
        .engine
        .list_user_transactions(Some(&f.bob), &filter, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let err = f
        .engine
        .list_user_transactions(Some(&f.admin), &filter, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let err = f
        .engine
        .list_user_transactions(None, &filter, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));
}

#[tokio::test]
async fn admin_listing_requires_admin_and_filters_by_email() {
    let f = fixture().await;
    f.engine
        .create_transaction(Some(&f.alice), buy(f.usd, f.usd_bank, 10))
        .await
        .unwrap();
    f.engine
        .create_transaction(Some(&f.bob), buy(f.usd, f.usd_bank, 20))
        .await
        .unwrap();

    let err = f
        .engine
        .list_admin_transactions(Some(&f.alice), &AdminTransactionFilter::default(), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let all = f
        .engine
        .list_admin_transactions(Some(&f.admin), &AdminTransactionFilter::default(), 0)
        .await
        .unwrap();
    assert_eq!(all.items.len(), 2);
    assert_eq!(all.total_pages, 1);

    let bobs = f
        .engine
        .list_admin_transactions(
            Some(&f.admin),
            &AdminTransactionFilter {
                user_email: Some("BOB@".to_string()),
                ..Default::default()
            },
            0,
        )
        .await
        .unwrap();
    assert_eq!(bobs.items.len(), 1);
    assert_eq!(bobs.items[0].user_email, "bob@example.com");
    assert_eq!(bobs.items[0].last_modified_by_email, None);
}

#[tokio::test]
async fn admin_edit_is_persisted_and_stamped() {
    let f = fixture().await;
    let created = f
        .engine
        .create_transaction(Some(&f.alice), buy(f.usd, f.usd_bank, 100))
        .await
        .unwrap();
    let id = created.transaction.id;

    let edited = f
        .engine
        .edit_transaction(
            Some(&f.admin),
            id,
            TransactionUpdate {
                status: Some(TransactionStatus::Completed),
                rate: Some(Decimal::new(98, 2)),
                crypto_amount: Some(Decimal::new(97, 0)),
                commission: Some(Decimal::new(1, 0)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.status, TransactionStatus::Completed);
    assert_eq!(edited.rate, Decimal::new(98, 2));
    assert_eq!(edited.crypto_amount, Decimal::new(97, 0));
    assert_eq!(edited.last_modified_by, Some(f.admin.user_id));
    assert!(edited.last_change_date.is_some());

    let completed = f
        .engine
        .list_admin_transactions(
            Some(&f.admin),
            &AdminTransactionFilter {
                statuses: vec![TransactionStatus::Completed],
                modified_by_email: Some("root".to_string()),
                ..Default::default()
            },
            0,
        )
        .await
        .unwrap();
    assert_eq!(completed.items.len(), 1);
    let row = &completed.items[0];
    assert_eq!(row.transaction.id, id);
    assert_eq!(row.user_email, "alice@example.com");
    assert_eq!(
        row.last_modified_by_email.as_deref(),
        Some("root@example.com")
    );

    let mine = f
        .engine
        .list_user_transactions(
            Some(&f.alice),
            &UserTransactionFilter {
                user_id: f.alice.user_id,
                status: Some(TransactionStatus::Completed),
                ..Default::default()
            },
            0,
        )
        .await
        .unwrap();
    assert_eq!(mine.items.len(), 1);
}

#[tokio::test]
async fn terminal_statuses_cannot_be_left() {
    let f = fixture().await;

    for terminal in [
        TransactionStatus::Completed,
        TransactionStatus::Cancelled,
        TransactionStatus::Failed,
        TransactionStatus::Deleted,
    ] {
        let created = f
            .engine
            .create_transaction(Some(&f.alice), buy(f.usd, f.usd_bank, 10))
            .await
            .unwrap();
        let id = created.transaction.id;
        f.engine
            .edit_transaction(Some(&f.admin), id, status(terminal))
            .await
            .unwrap();

        let err = f
            .engine
            .edit_transaction(Some(&f.admin), id, status(TransactionStatus::Pending))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidStatus(_)));

        // Re-applying the same status is accepted.
        f.engine
            .edit_transaction(Some(&f.admin), id, status(terminal))
            .await
            .unwrap();

        let listed = f
            .engine
            .list_admin_transactions(
                Some(&f.admin),
                &AdminTransactionFilter {
                    statuses: vec![terminal],
                    ..Default::default()
                },
                0,
            )
            .await
            .unwrap();
        assert_eq!(listed.items.len(), 1);
    }
}

#[tokio::test]
async fn edit_validates_caller_and_input() {
    let f = fixture().await;
    let created = f
        .engine
        .create_transaction(Some(&f.alice), buy(f.usd, f.usd_bank, 10))
        .await
        .unwrap();
    let id = created.transaction.id;

    let err = f
        .engine
        .edit_transaction(Some(&f.alice), id, status(TransactionStatus::Completed))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let err = f
        .engine
        .edit_transaction(Some(&f.admin), id, TransactionUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = f
        .engine
        .edit_transaction(
            Some(&f.admin),
            id,
            TransactionUpdate {
                fiat_amount: Some(Decimal::ZERO),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = f
        .engine
        .edit_transaction(Some(&f.admin), id + 100, status(TransactionStatus::Pending))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = f
        .engine
        .edit_transaction(
            Some(&f.admin),
            id,
            TransactionUpdate {
                wallet_address: Some("   ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn admin_listing_filters_by_modification_range() {
    let f = fixture().await;
    let edited = f
        .engine
        .create_transaction(Some(&f.alice), buy(f.usd, f.usd_bank, 10))
        .await
        .unwrap();
    f.engine
        .create_transaction(Some(&f.alice), buy(f.usd, f.usd_bank, 20))
        .await
        .unwrap();

    let before = Utc::now() - Duration::seconds(1);
    f.engine
        .edit_transaction(
            Some(&f.admin),
            edited.transaction.id,
            status(TransactionStatus::Pending),
        )
        .await
        .unwrap();
    let after = Utc::now() + Duration::seconds(1);

    let in_range = f
        .engine
        .list_admin_transactions(
            Some(&f.admin),
            &AdminTransactionFilter {
                modified_from: Some(before),
                modified_to: Some(after),
                ..Default::default()
            },
            0,
        )
        .await
        .unwrap();
    assert_eq!(in_range.items.len(), 1);
    assert_eq!(in_range.items[0].transaction.id, edited.transaction.id);

    let too_early = f
        .engine
        .list_admin_transactions(
            Some(&f.admin),
            &AdminTransactionFilter {
                modified_to: Some(before),
                ..Default::default()
            },
            0,
        )
        .await
        .unwrap();
    assert!(too_early.items.is_empty());
    assert_eq!(too_early.total_pages, 0);
}

#[tokio::test]
async fn created_bounds_are_inclusive() {
    let f = fixture().await;
    let created = f
        .engine
        .create_transaction(Some(&f.alice), buy(f.usd, f.usd_bank, 10))
        .await
        .unwrap();

    let listed = f
        .engine
        .list_user_transactions(
            Some(&f.alice),
            &UserTransactionFilter {
                user_id: f.alice.user_id,
                ..Default::default()
            },
            0,
        )
        .await
        .unwrap();
    let created_at = listed.items[0].transaction.created_at;

    let exact = f
        .engine
        .list_user_transactions(
            Some(&f.alice),
            &UserTransactionFilter {
                user_id: f.alice.user_id,
                created_from: Some(created_at),
                created_to: Some(created_at),
                ..Default::default()
            },
            0,
        )
        .await
        .unwrap();
    assert_eq!(exact.items.len(), 1);
    assert_eq!(exact.items[0].transaction.id, created.transaction.id);

    let admin_exact = f
        .engine
        .list_admin_transactions(
            Some(&f.admin),
            &AdminTransactionFilter {
                created_to: Some(created_at),
                ..Default::default()
            },
            0,
        )
        .await
        .unwrap();
    assert_eq!(admin_exact.items.len(), 1);
}

#[tokio::test]
async fn inverted_ranges_are_rejected() {
    let f = fixture().await;
    let now = Utc::now();

    let err = f
        .engine
        .list_user_transactions(
            Some(&f.alice),
            &UserTransactionFilter {
                user_id: f.alice.user_id,
                created_from: Some(now),
                created_to: Some(now - Duration::days(1)),
                ..Default::default()
            },
            0,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = f
        .engine
        .list_admin_transactions(
            Some(&f.admin),
            &AdminTransactionFilter {
                modified_from: Some(now),
                modified_to: Some(now - Duration::seconds(1)),
                ..Default::default()
            },
            0,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn like_wildcards_in_filters_match_literally() {
    let f = fixture().await;
    let underscored = Caller::user(user(&f.engine, "a_b", false).await);
    let plain = Caller::user(user(&f.engine, "axb", false).await);
    for caller in [&underscored, &plain] {
        f.engine
            .create_transaction(Some(caller), buy(f.usd, f.usd_bank, 10))
            .await
            .unwrap();
    }

    let by_email = |email: &str| AdminTransactionFilter {
        user_email: Some(email.to_string()),
        ..Default::default()
    };

    let matched = f
        .engine
        .list_admin_transactions(Some(&f.admin), &by_email("A_B@"), 0)
        .await
        .unwrap();
    assert_eq!(matched.items.len(), 1);
    assert_eq!(matched.items[0].user_email, "a_b@example.com");

    let percent = f
        .engine
        .list_admin_transactions(Some(&f.admin), &by_email("%"), 0)
        .await
        .unwrap();
    assert!(percent.items.is_empty());

    let underscore = f
        .engine
        .list_admin_transactions(
            Some(&f.admin),
            &AdminTransactionFilter {
                payment_id: Some("_".to_string()),
                ..Default::default()
            },
            0,
        )
        .await
        .unwrap();
    assert!(underscore.items.is_empty());
}

#[tokio::test]
async fn admin_transaction_resolves_emails() {
    let f = fixture().await;
    let created = f
        .engine
        .create_transaction(Some(&f.bob), buy(f.usd, f.usd_bank, 10))
        .await
        .unwrap();
    let id = created.transaction.id;

    let row = f
        .engine
        .admin_transaction(Some(&f.admin), id)
        .await
        .unwrap();
    assert_eq!(row.user_email, "bob@example.com");
    assert_eq!(row.fiat_currency, "USD");
    assert_eq!(row.last_modified_by_email, None);

    f.engine
        .edit_transaction(Some(&f.admin), id, status(TransactionStatus::Pending))
        .await
        .unwrap();
    let row = f
        .engine
        .admin_transaction(Some(&f.admin), id)
        .await
        .unwrap();
    assert_eq!(row.transaction.status, TransactionStatus::Pending);
    assert_eq!(
        row.last_modified_by_email.as_deref(),
        Some("root@example.com")
    );

    let err = f
        .engine
        .admin_transaction(Some(&f.bob), id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let err = f
        .engine
        .admin_transaction(Some(&f.admin), id + 100)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}
