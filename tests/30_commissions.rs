mod common;

use anyhow::Result;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;

// Commission ledger: paid + remaining == total before and after every
// successful payment, and an overdraft leaves the row untouched.

fn dec(v: &Value) -> Decimal {
    match v {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("expected a decimal value, got {}", other),
    }
}

fn assert_balanced(row: &Value) {
    assert_eq!(
        dec(&row["paid_amount"]) + dec(&row["remaining_commission"]),
        dec(&row["total_commission"]),
        "ledger invariant violated: {}",
        row
    );
}

#[tokio::test]
async fn store_pay_and_overdraft_scenario() -> Result<()> {
    let Some(pool) = common::try_pool().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let ceo = common::seed_user(&pool, "ceo").await?;
    let beneficiary = common::seed_user(&pool, "agent").await?;
    let deal = common::seed_deal(&pool).await?;
    let token = common::token_for(ceo, "ceo");

    // Store: paid starts at zero, remaining at the full commission
    let res = client
        .post(format!("{}/api/commission/store-commissions", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "deal_id": deal,
            "commission_data": [{ "user_id": beneficiary, "commission": 1000 }],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let stored = &body["data"][0];
    assert_eq!(dec(&stored["paid_amount"]), Decimal::ZERO);
    assert_eq!(dec(&stored["remaining_commission"]), Decimal::from(1000));
    assert_balanced(stored);

    // Pay 400 -> 400 paid / 600 remaining
    let res = client
        .put(format!("{}/api/commission/commissions/pay", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "user_id": beneficiary, "deal_id": deal, "payment_amount": 400 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(dec(&body["data"]["paid_amount"]), Decimal::from(400));
    assert_eq!(dec(&body["data"]["remaining_commission"]), Decimal::from(600));
    assert_balanced(&body["data"]);

    // Pay 700 -> rejected, state unchanged
    let res = client
        .put(format!("{}/api/commission/commissions/pay", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "user_id": beneficiary, "deal_id": deal, "payment_amount": 700 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(format!(
            "{}/api/commission/commissions/deal/{}",
            server.base_url, deal
        ))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let row = &body["data"][0];
    assert_eq!(dec(&row["paid_amount"]), Decimal::from(400));
    assert_eq!(dec(&row["remaining_commission"]), Decimal::from(600));
    assert_balanced(row);
    // Deal and user details are joined into the listing
    assert_eq!(row["deal_status"], "Won");
    assert_eq!(row["user_name"], "test-agent");

    // Paying out the exact remainder is allowed and closes the ledger
    let res = client
        .put(format!("{}/api/commission/commissions/pay", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "user_id": beneficiary, "deal_id": deal, "payment_amount": 600 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(dec(&body["data"]["remaining_commission"]), Decimal::ZERO);
    assert_balanced(&body["data"]);

    Ok(())
}

#[tokio::test]
async fn store_validates_references_and_amounts() -> Result<()> {
    let Some(pool) = common::try_pool().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let ceo = common::seed_user(&pool, "ceo").await?;
    let beneficiary = common::seed_user(&pool, "agent").await?;
    let deal = common::seed_deal(&pool).await?;
    let token = common::token_for(ceo, "ceo");

    // Unknown deal
    let res = client
        .post(format!("{}/api/commission/store-commissions", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "deal_id": Uuid::new_v4(),
            "commission_data": [{ "user_id": beneficiary, "commission": 100 }],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Unknown beneficiary
    let res = client
        .post(format!("{}/api/commission/store-commissions", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "deal_id": deal,
            "commission_data": [{ "user_id": Uuid::new_v4(), "commission": 100 }],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Negative commission
    let res = client
        .post(format!("{}/api/commission/store-commissions", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "deal_id": deal,
            "commission_data": [{ "user_id": beneficiary, "commission": -5 }],
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Paying against a pair with no ledger row
    let res = client
        .put(format!("{}/api/commission/commissions/pay", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "user_id": beneficiary, "deal_id": deal, "payment_amount": 10 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn paying_requires_the_pay_capability() -> Result<()> {
    let Some(pool) = common::try_pool().await? else {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    };
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // HODs can view commissions but cannot pay them out
    let hod = common::seed_user(&pool, "hod").await?;
    let token = common::token_for(hod, "hod");

    let res = client
        .get(format!("{}/api/commission/commissions", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .put(format!("{}/api/commission/commissions/pay", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "user_id": hod, "deal_id": Uuid::new_v4(), "payment_amount": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    Ok(())
}
