//! Transaction engine behaviour through the public API.

mod common;

use common::fixture;
use ud_core::{ErrorKind, ItemRequest, Money, PageRequest, SkipReason, TransactionStatus};
use ud_engine::{TransactionFilter, UpdateGoods, UpdateTransaction};

fn money(amount: i64) -> Money {
    Money::from_amount(amount)
}

#[tokio::test]
async fn test_create_prices_items_from_catalog() {
    let fx = fixture().await;
    let rice = fx.goods("Beras", 10_000, 6_000).await;

    let result = fx.draft(vec![ItemRequest::new(&rice.id, 3)]).await;

    assert!(result.skipped.is_empty());
    let item = &result.detail.items[0];
    assert_eq!(item.sale_price, money(10_000));
    assert_eq!(item.cost_price, money(6_000));
    assert_eq!(item.subtotal_sale, money(30_000));
    assert_eq!(item.subtotal_cost, money(18_000));
    assert_eq!(item.profit, money(12_000));
    assert_eq!(item.trading_unit_id, fx.unit.id);

    let header = result.transaction();
    assert_eq!(header.status, TransactionStatus::Draft);
    assert_eq!(header.created_by, fx.operator.id);
    assert_eq!(header.total_sale, money(30_000));
    assert_eq!(header.total_cost, money(18_000));
    assert_eq!(header.total_profit, money(12_000));

    let stored = fx.engine.transactions().get_detail(&header.id).await.unwrap();
    assert_eq!(stored, result.detail);
}

#[tokio::test]
async fn test_totals_equal_sum_of_items() {
    let fx = fixture().await;
    let rice = fx.goods("Beras", 14_000, 11_500).await;
    let oil = fx.goods("Minyak", 18_000, 15_000).await;
    let sugar = fx.goods("Gula", 16_000, 13_000).await;

    let result = fx
        .draft(vec![
            ItemRequest::new(&rice.id, 2),
            ItemRequest::new(&oil.id, 5),
            ItemRequest::new(&sugar.id, 1),
        ])
        .await;

    let items = &result.detail.items;
    let sale: i64 = items.iter().map(|i| i.subtotal_sale.amount()).sum();
    let cost: i64 = items.iter().map(|i| i.subtotal_cost.amount()).sum();
    let header = result.transaction();

    assert_eq!(header.total_sale.amount(), sale);
    assert_eq!(header.total_cost.amount(), cost);
    assert_eq!(header.total_profit.amount(), sale - cost);
    assert_eq!(sale, 28_000 + 90_000 + 16_000);
    for item in items {
        assert_eq!(item.profit, item.subtotal_sale - item.subtotal_cost);
    }
}

#[tokio::test]
async fn test_create_without_items_has_zero_totals() {
    let fx = fixture().await;

    let result = fx.draft(vec![]).await;

    assert!(result.detail.items.is_empty());
    assert_eq!(result.transaction().total_sale, Money::zero());
    assert_eq!(result.transaction().total_profit, Money::zero());
}

#[tokio::test]
async fn test_missing_goods_are_skipped_and_reported() {
    let fx = fixture().await;
    let rice = fx.goods("Beras", 10_000, 6_000).await;
    let oil = fx.goods("Minyak", 18_000, 15_000).await;

    let result = fx
        .draft(vec![
            ItemRequest::new(&rice.id, 1),
            ItemRequest::new("no-such-goods", 4),
            ItemRequest::new(&oil.id, 2),
        ])
        .await;

    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].index, 1);
    assert_eq!(result.skipped[0].goods_id, "no-such-goods");
    assert_eq!(result.skipped[0].reason, SkipReason::GoodsNotFound);

    let positions: Vec<i64> = result.detail.items.iter().map(|i| i.position).collect();
    assert_eq!(positions, vec![0, 1]);
    assert_eq!(result.transaction().total_sale, money(10_000 + 36_000));
}

#[tokio::test]
async fn test_non_positive_quantity_rejects_whole_request() {
    let fx = fixture().await;
    let rice = fx.goods("Beras", 10_000, 6_000).await;

    for quantity in [0, -2] {
        let err = fx
            .engine
            .transactions()
            .create(
                &fx.operator,
                fx.request(vec![
                    ItemRequest::new(&rice.id, 1),
                    ItemRequest::new(&rice.id, quantity),
                ]),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuantity);
    }

    let page = fx
        .engine
        .transactions()
        .list(&TransactionFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_totals_beyond_i64_are_rejected() {
    let fx = fixture().await;
    let half = i64::MAX / 2 + 1;
    let gold = fx.goods("Emas Batangan", half, 0).await;
    let items = vec![ItemRequest::new(&gold.id, 1), ItemRequest::new(&gold.id, 1)];

    let err = fx
        .engine
        .transactions()
        .create(&fx.operator, fx.request(items.clone()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);

    let page = fx
        .engine
        .transactions()
        .list(&TransactionFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    let created = fx.draft(vec![ItemRequest::new(&gold.id, 1)]).await;
    let err = fx
        .engine
        .transactions()
        .update(
            &fx.operator,
            &created.transaction().id,
            UpdateTransaction {
                items: Some(items),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);

    let stored = fx
        .engine
        .transactions()
        .get_detail(&created.transaction().id)
        .await
        .unwrap();
    assert_eq!(stored, created.detail);
}

#[tokio::test]
async fn test_create_requires_existing_kitchen_and_period() {
    let fx = fixture().await;

    let mut request = fx.request(vec![]);
    request.kitchen_id = "missing-kitchen".into();
    let err = fx.engine.transactions().create(&fx.operator, request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let mut request = fx.request(vec![]);
    request.period_id = "missing-period".into();
    let err = fx.engine.transactions().create(&fx.operator, request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let mut request = fx.request(vec![]);
    request.period_id = "  ".into();
    let err = fx.engine.transactions().create(&fx.operator, request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
}

#[tokio::test]
async fn test_date_defaults_to_clock_today() {
    let fx = fixture().await;

    let mut request = fx.request(vec![]);
    request.transaction_date = None;
    let result = fx.engine.transactions().create(&fx.operator, request).await.unwrap();

    assert_eq!(result.transaction().transaction_date, common::date(2025, 1, 15));
    assert_eq!(result.transaction().code, "TRX-20250115-001");
}

#[tokio::test]
async fn test_items_replaced_three_times_then_completed() {
    let fx = fixture().await;
    let rice = fx.goods("Beras", 10_000, 6_000).await;
    let oil = fx.goods("Minyak", 18_000, 15_000).await;
    let created = fx.draft(vec![ItemRequest::new(&rice.id, 1)]).await;
    let id = created.transaction().id.clone();

    let sets = [
        vec![ItemRequest::new(&rice.id, 7), ItemRequest::new(&oil.id, 1)],
        vec![ItemRequest::new(&oil.id, 4)],
        vec![ItemRequest::new(&rice.id, 2), ItemRequest::new(&oil.id, 3)],
    ];
    for items in sets {
        fx.engine
            .transactions()
            .update(
                &fx.operator,
                &id,
                UpdateTransaction {
                    items: Some(items),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let detail = fx.engine.transactions().complete(&fx.operator, &id).await.unwrap();

    assert_eq!(detail.transaction.status, TransactionStatus::Completed);
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.transaction.total_sale, money(20_000 + 54_000));
    assert_eq!(detail.transaction.total_cost, money(12_000 + 45_000));
    assert_eq!(detail.transaction.total_profit, money(74_000 - 57_000));

    let stored = fx.engine.transactions().get_detail(&id).await.unwrap();
    assert_eq!(stored.items.len(), 2);
    assert_eq!(stored.transaction.total_sale, money(74_000));
}

#[tokio::test]
async fn test_update_without_items_keeps_items() {
    let fx = fixture().await;
    let rice = fx.goods("Beras", 10_000, 6_000).await;
    let created = fx.draft(vec![ItemRequest::new(&rice.id, 3)]).await;
    let id = created.transaction().id.clone();

    let updated = fx
        .engine
        .transactions()
        .update(
            &fx.operator,
            &id,
            UpdateTransaction {
                transaction_date: Some(common::date(2025, 1, 20)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.detail.transaction.transaction_date, common::date(2025, 1, 20));
    assert_eq!(updated.detail.transaction.code, created.transaction().code);
    assert_eq!(updated.detail.items, created.detail.items);
    assert_eq!(updated.detail.transaction.total_sale, money(30_000));
    assert_eq!(updated.detail.transaction.total_profit, money(12_000));

    let stored = fx.engine.transactions().get_detail(&id).await.unwrap();
    assert_eq!(stored.transaction.total_cost, money(18_000));
    assert_eq!(stored, updated.detail);
}

#[tokio::test]
async fn test_update_with_empty_items_clears_them() {
    let fx = fixture().await;
    let rice = fx.goods("Beras", 10_000, 6_000).await;
    let created = fx.draft(vec![ItemRequest::new(&rice.id, 3)]).await;
    let id = created.transaction().id.clone();

    let updated = fx
        .engine
        .transactions()
        .update(
            &fx.operator,
            &id,
            UpdateTransaction {
                items: Some(vec![]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(updated.detail.items.is_empty());
    assert_eq!(updated.detail.transaction.total_sale, Money::zero());
    let stored = fx.engine.transactions().get_detail(&id).await.unwrap();
    assert!(stored.items.is_empty());
}

#[tokio::test]
async fn test_update_rejects_bad_quantity_without_touching_items() {
    let fx = fixture().await;
    let rice = fx.goods("Beras", 10_000, 6_000).await;
    let created = fx.draft(vec![ItemRequest::new(&rice.id, 3)]).await;
    let id = created.transaction().id.clone();

    let err = fx
        .engine
        .transactions()
        .update(
            &fx.operator,
            &id,
            UpdateTransaction {
                items: Some(vec![ItemRequest::new(&rice.id, 0)]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidQuantity);
    let stored = fx.engine.transactions().get_detail(&id).await.unwrap();
    assert_eq!(stored, created.detail);
}

#[tokio::test]
async fn test_prices_are_snapshots() {
    let fx = fixture().await;
    let rice = fx.goods("Beras", 10_000, 6_000).await;
    let created = fx.draft(vec![ItemRequest::new(&rice.id, 3)]).await;

    fx.engine
        .goods()
        .update(
            &fx.admin,
            &rice.id,
            UpdateGoods {
                sale_price: Some(money(20_000)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let detail = fx
        .engine
        .transactions()
        .complete(&fx.operator, &created.transaction().id)
        .await
        .unwrap();
    assert_eq!(detail.items[0].sale_price, money(10_000));
    assert_eq!(detail.transaction.total_sale, money(30_000));

    // Items priced after the change pick it up.
    let later = fx.draft(vec![ItemRequest::new(&rice.id, 1)]).await;
    assert_eq!(later.transaction().total_sale, money(20_000));
}

#[tokio::test]
async fn test_cancel_twice_reports_already_cancelled() {
    let fx = fixture().await;
    let rice = fx.goods("Beras", 10_000, 6_000).await;
    let created = fx.draft(vec![ItemRequest::new(&rice.id, 3)]).await;
    let id = created.transaction().id.clone();

    let cancelled = fx.engine.transactions().cancel(&fx.operator, &id).await.unwrap();
    assert_eq!(cancelled.status, TransactionStatus::Cancelled);

    let before = fx.engine.transactions().get_detail(&id).await.unwrap();
    let err = fx.engine.transactions().cancel(&fx.operator, &id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyCancelled);

    let after = fx.engine.transactions().get_detail(&id).await.unwrap();
    assert_eq!(after, before);
    assert_eq!(after.transaction.status, TransactionStatus::Cancelled);
    assert_eq!(after.transaction.total_sale, money(30_000));
    assert_eq!(after.items.len(), 1);
}

#[tokio::test]
async fn test_completed_transaction_rejects_update_and_complete() {
    let fx = fixture().await;
    let rice = fx.goods("Beras", 10_000, 6_000).await;
    let created = fx.draft(vec![ItemRequest::new(&rice.id, 3)]).await;
    let id = created.transaction().id.clone();
    fx.engine.transactions().complete(&fx.operator, &id).await.unwrap();
    let before = fx.engine.transactions().get_detail(&id).await.unwrap();

    let err = fx
        .engine
        .transactions()
        .update(
            &fx.operator,
            &id,
            UpdateTransaction {
                items: Some(vec![ItemRequest::new(&rice.id, 9)]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);

    let err = fx.engine.transactions().complete(&fx.operator, &id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);

    assert_eq!(fx.engine.transactions().get_detail(&id).await.unwrap(), before);
}

#[tokio::test]
async fn test_cancelled_transaction_rejects_update_and_complete() {
    let fx = fixture().await;
    let created = fx.draft(vec![]).await;
    let id = created.transaction().id.clone();
    fx.engine.transactions().cancel(&fx.operator, &id).await.unwrap();

    let err = fx
        .engine
        .transactions()
        .update(&fx.operator, &id, UpdateTransaction::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);

    let err = fx.engine.transactions().complete(&fx.operator, &id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
}

#[tokio::test]
async fn test_cancel_completed_keeps_items_and_totals() {
    let fx = fixture().await;
    let rice = fx.goods("Beras", 10_000, 6_000).await;
    let created = fx.draft(vec![ItemRequest::new(&rice.id, 2)]).await;
    let id = created.transaction().id.clone();
    fx.engine.transactions().complete(&fx.operator, &id).await.unwrap();

    fx.engine.transactions().cancel(&fx.operator, &id).await.unwrap();

    let stored = fx.engine.transactions().get_detail(&id).await.unwrap();
    assert_eq!(stored.transaction.status, TransactionStatus::Cancelled);
    assert_eq!(stored.transaction.total_sale, money(20_000));
    assert_eq!(stored.items.len(), 1);
}

#[tokio::test]
async fn test_unknown_transaction_is_not_found() {
    let fx = fixture().await;

    let err = fx.engine.transactions().get_detail("nope").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = fx.engine.transactions().complete(&fx.operator, "nope").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = fx.engine.transactions().cancel(&fx.operator, "nope").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let fx = fixture().await;
    let first = fx.draft(vec![]).await;
    fx.draft(vec![]).await;
    fx.engine
        .transactions()
        .cancel(&fx.operator, &first.transaction().id)
        .await
        .unwrap();

    let filter = TransactionFilter {
        status: Some(TransactionStatus::Draft),
        ..Default::default()
    };
    let drafts = fx.engine.transactions().list(&filter, PageRequest::default()).await.unwrap();

    assert_eq!(drafts.total, 1);
    assert_eq!(drafts.items[0].code, "TRX-20250115-002");
}
