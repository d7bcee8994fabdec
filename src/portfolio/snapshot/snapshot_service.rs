use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use log::debug;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::assets::AssetRepositoryTrait;
use crate::cashflow::CashFlowRepositoryTrait;
use crate::constants::{DECIMAL_PRECISION, PCT_DECIMAL_PRECISION};
use crate::errors::{Error, Result, ValidationError};
use crate::fx::FxRateCache;
use crate::market_data::MarketDataProviderTrait;
use crate::portfolio::performance::calculate_xirr;
use crate::portfolio::portfolio_traits::PortfolioRepositoryTrait;
use crate::portfolio::positions::PositionsServiceTrait;
use crate::portfolio::valuation::ValuationServiceTrait;
use crate::settings::Settings;
use crate::transactions::{TransactionKind, TransactionRepositoryTrait};
use crate::utils::slug::generate_unique_slug;
use crate::utils::time_utils::{month_window, year_bounds, year_window};

use super::snapshot_model::{Period, Snapshot, SnapshotItem, SnapshotKind};
use super::snapshot_repository::SnapshotRepositoryTrait;

#[async_trait]
pub trait SnapshotServiceTrait: Send + Sync {
    async fn create_portfolio_snapshot(
        &self,
        portfolio_id: &str,
        period: Period,
        snapshot_date: Option<NaiveDate>,
        name: Option<String>,
    ) -> Result<Snapshot>;

    async fn create_cashflow_snapshot(
        &self,
        flow_id: &str,
        period: Period,
        snapshot_date: Option<NaiveDate>,
        name: Option<String>,
    ) -> Result<Snapshot>;

    async fn create_salary_savings_snapshot(
        &self,
        flow_id: &str,
        snapshot_date: Option<NaiveDate>,
        name: Option<String>,
    ) -> Result<Snapshot>;

    async fn create_dividend_snapshot(
        &self,
        year: i32,
        currency: &str,
        snapshot_date: Option<NaiveDate>,
        name: Option<String>,
    ) -> Result<Snapshot>;

    /// Backfills the money-weighted return of a portfolio snapshot from the
    /// Buy/Sell ledger plus the snapshot's total value as terminal inflow.
    /// The portfolio's first-ever snapshot stays `None`.
    async fn update_irr(&self, snapshot_id: &str) -> Result<Option<f64>>;
}

pub struct SnapshotService {
    settings: Settings,
    portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    cashflow_repository: Arc<dyn CashFlowRepositoryTrait>,
    snapshot_repository: Arc<dyn SnapshotRepositoryTrait>,
    positions_service: Arc<dyn PositionsServiceTrait>,
    valuation_service: Arc<dyn ValuationServiceTrait>,
    provider: Arc<dyn MarketDataProviderTrait>,
    entity_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SnapshotService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: Settings,
        portfolio_repository: Arc<dyn PortfolioRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        cashflow_repository: Arc<dyn CashFlowRepositoryTrait>,
        snapshot_repository: Arc<dyn SnapshotRepositoryTrait>,
        positions_service: Arc<dyn PositionsServiceTrait>,
        valuation_service: Arc<dyn ValuationServiceTrait>,
        provider: Arc<dyn MarketDataProviderTrait>,
    ) -> Self {
        SnapshotService {
            settings,
            portfolio_repository,
            transaction_repository,
            asset_repository,
            cashflow_repository,
            snapshot_repository,
            positions_service,
            valuation_service,
            provider,
            entity_locks: DashMap::new(),
        }
    }

    /// Snapshot creation for one entity is serialized; different entities
    /// proceed independently.
    fn entity_lock(&self, kind: SnapshotKind, entity_id: &str) -> Arc<Mutex<()>> {
        let key = format!("{}:{}", kind.as_str(), entity_id);
        self.entity_locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn unique_slug(&self, name: &str) -> Result<String> {
        generate_unique_slug(name, |candidate| {
            self.snapshot_repository.slug_exists(candidate)
        })
    }

    fn pct_of(part: Decimal, total: Decimal) -> Decimal {
        if total != Decimal::ZERO {
            (part / total).round_dp(PCT_DECIMAL_PRECISION)
        } else {
            Decimal::ZERO
        }
    }
}

#[async_trait]
impl SnapshotServiceTrait for SnapshotService {
    async fn create_portfolio_snapshot(
        &self,
        portfolio_id: &str,
        period: Period,
        snapshot_date: Option<NaiveDate>,
        name: Option<String>,
    ) -> Result<Snapshot> {
        let portfolio = self.portfolio_repository.get_by_id(portfolio_id)?;
        let lock = self.entity_lock(SnapshotKind::Portfolio, portfolio_id);
        let _guard = lock.lock().await;

        let as_of = snapshot_date;
        let snapshot_date = snapshot_date.unwrap_or_else(|| Utc::now().date_naive());
        let currency = portfolio
            .currency
            .clone()
            .unwrap_or_else(|| self.settings.base_currency());

        let positions = self
            .positions_service
            .get_positions(portfolio_id, Some(snapshot_date))?;
        let valuation = self
            .valuation_service
            .value_positions(&positions, &currency, as_of)
            .await?;

        let name = name.unwrap_or_else(|| format!("{} {}", portfolio.name, snapshot_date));
        let slug = self.unique_slug(&name)?;

        let mut snapshot = Snapshot::new(
            SnapshotKind::Portfolio,
            portfolio_id,
            snapshot_date,
            name,
            slug,
            &currency,
        );
        snapshot.period = Some(period);
        snapshot.total_value = valuation.total_value.round_dp(DECIMAL_PRECISION);
        snapshot.total_cost = valuation.total_cost.round_dp(DECIMAL_PRECISION);
        snapshot.total_gain_loss = valuation.total_gain_loss.round_dp(DECIMAL_PRECISION);
        snapshot.total_gain_loss_pct = valuation.total_gain_loss_pct;

        let items: Vec<SnapshotItem> = valuation
            .positions
            .iter()
            .map(|valued| {
                let mut item = SnapshotItem::new(&snapshot.id, &valued.symbol);
                item.asset_id = Some(valued.asset_id.clone());
                item.quantity = Some(valued.quantity);
                item.average_cost = Some(valued.average_cost);
                item.current_price = Some(valued.current_price);
                item.cost_basis = valued.cost_basis;
                item.market_value = valued.market_value;
                item.gain_loss = valued.gain_loss;
                item.allocation_pct = valued.allocation_pct;
                item.rounded()
            })
            .collect();

        self.snapshot_repository.save(&snapshot, &items)?;
        debug!(
            "Created portfolio snapshot {} ({} items, total {})",
            snapshot.slug,
            items.len(),
            snapshot.total_value
        );
        Ok(snapshot)
    }

    async fn create_cashflow_snapshot(
        &self,
        flow_id: &str,
        period: Period,
        snapshot_date: Option<NaiveDate>,
        name: Option<String>,
    ) -> Result<Snapshot> {
        let label = self.cashflow_repository.get_flow_label(flow_id)?;
        let lock = self.entity_lock(SnapshotKind::CashFlow, flow_id);
        let _guard = lock.lock().await;

        let snapshot_date = snapshot_date.unwrap_or_else(|| Utc::now().date_naive());
        let (start, end) = match period {
            Period::Monthly => month_window(snapshot_date),
            Period::Yearly => year_window(snapshot_date),
        };
        let currency = self.settings.base_currency();

        let entries = self
            .cashflow_repository
            .get_entries_in_range(flow_id, start, end)?;

        let mut fx_cache = FxRateCache::new(self.provider.clone());
        let mut categories: BTreeMap<String, Decimal> = BTreeMap::new();
        for entry in &entries {
            let (rate, _) = fx_cache
                .rate_or_fallback(&entry.currency, &currency, Some(entry.entry_date))
                .await;
            *categories.entry(entry.category.clone()).or_default() +=
                entry.signed_amount() * rate;
        }

        let total_net: Decimal = categories.values().copied().sum();
        let total_abs: Decimal = categories.values().map(|amount| amount.abs()).sum();

        let name = name.unwrap_or_else(|| format!("{} {}", label, snapshot_date));
        let slug = self.unique_slug(&name)?;

        let mut snapshot = Snapshot::new(
            SnapshotKind::CashFlow,
            flow_id,
            snapshot_date,
            name,
            slug,
            &currency,
        );
        snapshot.period = Some(period);
        snapshot.total_value = total_net.round_dp(DECIMAL_PRECISION);

        let items: Vec<SnapshotItem> = categories
            .iter()
            .map(|(category, amount)| {
                let mut item = SnapshotItem::new(&snapshot.id, category);
                item.market_value = *amount;
                item.allocation_pct = Self::pct_of(amount.abs(), total_abs);
                item.rounded()
            })
            .collect();

        self.snapshot_repository.save(&snapshot, &items)?;
        Ok(snapshot)
    }

    async fn create_salary_savings_snapshot(
        &self,
        flow_id: &str,
        snapshot_date: Option<NaiveDate>,
        name: Option<String>,
    ) -> Result<Snapshot> {
        let label = self.cashflow_repository.get_flow_label(flow_id)?;
        let lock = self.entity_lock(SnapshotKind::SalarySavings, flow_id);
        let _guard = lock.lock().await;

        let snapshot_date = snapshot_date.unwrap_or_else(|| Utc::now().date_naive());
        let (start, end) = month_window(snapshot_date);
        let currency = self.settings.base_currency();

        let records = self
            .cashflow_repository
            .get_salary_records_in_range(flow_id, start, end)?;

        let mut fx_cache = FxRateCache::new(self.provider.clone());
        let mut salary_total = Decimal::ZERO;
        let mut saved_total = Decimal::ZERO;
        for record in &records {
            let (rate, _) = fx_cache
                .rate_or_fallback(&record.currency, &currency, Some(record.record_date))
                .await;
            salary_total += record.salary * rate;
            saved_total += record.saved * rate;
        }

        let name = name.unwrap_or_else(|| format!("{} {}", label, snapshot_date));
        let slug = self.unique_slug(&name)?;

        let mut snapshot = Snapshot::new(
            SnapshotKind::SalarySavings,
            flow_id,
            snapshot_date,
            name,
            slug,
            &currency,
        );
        snapshot.period = Some(Period::Monthly);
        snapshot.total_value = salary_total.round_dp(DECIMAL_PRECISION);
        snapshot.total_gain_loss = saved_total.round_dp(DECIMAL_PRECISION);
        // Savings rate doubles as the gain percentage.
        snapshot.total_gain_loss_pct = Self::pct_of(saved_total, salary_total);

        let mut salary_item = SnapshotItem::new(&snapshot.id, "salary");
        salary_item.market_value = salary_total;
        salary_item.allocation_pct = Decimal::ONE;
        let mut savings_item = SnapshotItem::new(&snapshot.id, "savings");
        savings_item.market_value = saved_total;
        savings_item.allocation_pct = Self::pct_of(saved_total, salary_total);

        let items = vec![salary_item.rounded(), savings_item.rounded()];
        self.snapshot_repository.save(&snapshot, &items)?;
        Ok(snapshot)
    }

    async fn create_dividend_snapshot(
        &self,
        year: i32,
        currency: &str,
        snapshot_date: Option<NaiveDate>,
        name: Option<String>,
    ) -> Result<Snapshot> {
        let lock = self.entity_lock(SnapshotKind::Dividend, currency);
        let _guard = lock.lock().await;

        let snapshot_date = snapshot_date.unwrap_or_else(|| Utc::now().date_naive());
        let (start, end) = year_bounds(year);
        let income = self.transaction_repository.get_income_in_range(start, end)?;

        let mut fx_cache = FxRateCache::new(self.provider.clone());
        // symbol -> (asset id, summed amount in the target currency)
        let mut per_asset: BTreeMap<String, (String, Decimal)> = BTreeMap::new();
        for tx in &income {
            let asset = self.asset_repository.get_by_id(&tx.asset_id)?;
            let (rate, _) = fx_cache
                .rate_or_fallback(&asset.currency, currency, Some(tx.trade_date))
                .await;
            let entry = per_asset
                .entry(asset.display_label().to_string())
                .or_insert_with(|| (asset.id.clone(), Decimal::ZERO));
            entry.1 += tx.gross_amount() * rate;
        }

        let total: Decimal = per_asset.values().map(|(_, amount)| *amount).sum();

        let name = name.unwrap_or_else(|| format!("Dividends {} {}", year, currency));
        let slug = self.unique_slug(&name)?;

        let mut snapshot = Snapshot::new(
            SnapshotKind::Dividend,
            currency,
            snapshot_date,
            name,
            slug,
            currency,
        );
        snapshot.year = Some(year);
        snapshot.total_value = total.round_dp(DECIMAL_PRECISION);

        let items: Vec<SnapshotItem> = per_asset
            .iter()
            .map(|(symbol, (asset_id, amount))| {
                let mut item = SnapshotItem::new(&snapshot.id, symbol);
                item.asset_id = Some(asset_id.clone());
                item.market_value = *amount;
                item.allocation_pct = Self::pct_of(*amount, total);
                item.rounded()
            })
            .collect();

        self.snapshot_repository.save(&snapshot, &items)?;
        Ok(snapshot)
    }

    async fn update_irr(&self, snapshot_id: &str) -> Result<Option<f64>> {
        let snapshot = self.snapshot_repository.get_by_id(snapshot_id)?;
        if snapshot.kind != SnapshotKind::Portfolio {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "IRR backfill only applies to portfolio snapshots, not {}",
                snapshot.kind.as_str()
            ))));
        }

        // No predecessor means no return period to measure yet.
        let previous = self.snapshot_repository.get_latest_before(
            SnapshotKind::Portfolio,
            &snapshot.entity_id,
            snapshot.snapshot_date,
        )?;
        if previous.is_none() {
            debug!(
                "Snapshot {} is the first for {}; leaving IRR unset",
                snapshot.slug, snapshot.entity_id
            );
            return Ok(None);
        }

        let transactions = self
            .transaction_repository
            .get_for_portfolio(&snapshot.entity_id)?;
        let mut cash_flows: Vec<(NaiveDate, Decimal)> = transactions
            .iter()
            .filter(|tx| tx.trade_date <= snapshot.snapshot_date)
            .filter_map(|tx| match &tx.kind {
                TransactionKind::Buy { .. } => Some((tx.trade_date, -tx.gross_amount())),
                TransactionKind::Sell { .. } => Some((tx.trade_date, tx.gross_amount())),
                _ => None,
            })
            .collect();
        cash_flows.push((snapshot.snapshot_date, snapshot.total_value));

        let rate = calculate_xirr(&cash_flows);
        if let Some(rate) = rate {
            self.snapshot_repository.set_irr(snapshot_id, rate)?;
        }
        Ok(rate)
    }
}
