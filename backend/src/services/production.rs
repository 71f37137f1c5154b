//! Production costing: draft runs, material plans, extra costs, completion
//!
//! A draft run is a plan. Nothing moves in the inventory ledger until
//! completion, which consumes every material, receives the output at its
//! computed unit cost and posts the production entry in one transaction.
//! Completed runs are frozen.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::inventory::InventoryService;
use crate::services::journal::JournalService;
use crate::services::valuation;
use shared::{
    output_unit_cost, production_extra_cost_lines, reversal_lines, validate_positive_amount,
    validate_positive_quantity, JournalEventType, MovementType, ProductionStatus,
};

#[derive(Clone)]
pub struct ProductionService {
    db: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct CreateRunInput {
    pub output_item_id: Uuid,
    pub warehouse_id: Uuid,
    pub output_quantity: Decimal,
    pub run_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct AddMaterialInput {
    pub item_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct AddCostInput {
    pub label: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductionRunRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub output_item_id: Uuid,
    pub warehouse_id: Uuid,
    pub output_quantity: Decimal,
    pub output_unit_cost: Option<Decimal>,
    pub status: String,
    pub run_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductionMaterialRecord {
    pub id: Uuid,
    pub run_id: Uuid,
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductionCostRecord {
    pub id: Uuid,
    pub run_id: Uuid,
    pub label: String,
    pub amount: Decimal,
}

/// A run with its materials and extra costs
#[derive(Debug, Clone, Serialize)]
pub struct RunDetail {
    #[serde(flatten)]
    pub run: ProductionRunRecord,
    pub materials: Vec<ProductionMaterialRecord>,
    pub costs: Vec<ProductionCostRecord>,
}

impl ProductionService {
    /// Create a new ProductionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a draft run
    pub async fn create_run(
        &self,
        company_id: Uuid,
        input: CreateRunInput,
    ) -> AppResult<ProductionRunRecord> {
        validate_positive_quantity(input.output_quantity).map_err(|msg| AppError::Validation {
            field: "output_quantity".to_string(),
            message: msg.to_string(),
        })?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM items WHERE id = $1 AND company_id = $2)",
        )
        .bind(input.output_item_id)
        .bind(company_id)
        .fetch_one(&self.db)
        .await?;
        if !exists {
            return Err(AppError::NotFound("Item".to_string()));
        }

        let run = sqlx::query_as::<_, ProductionRunRecord>(
            r#"
            INSERT INTO production_runs (company_id, output_item_id, warehouse_id, output_quantity, status, run_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, company_id, output_item_id, warehouse_id, output_quantity, output_unit_cost, status, run_date, created_at
            "#,
        )
        .bind(company_id)
        .bind(input.output_item_id)
        .bind(input.warehouse_id)
        .bind(input.output_quantity)
        .bind(ProductionStatus::Draft.as_str())
        .bind(input.run_date)
        .fetch_one(&self.db)
        .await?;

        Ok(run)
    }

    /// Add a planned material to a draft run.
    ///
    /// Availability is checked as a courtesy only; the binding check is the
    /// conditional decrement at completion.
    pub async fn add_material(
        &self,
        company_id: Uuid,
        run_id: Uuid,
        input: AddMaterialInput,
    ) -> AppResult<ProductionMaterialRecord> {
        validate_positive_quantity(input.quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;

        let mut tx = self.db.begin().await?;
        let run = Self::fetch_draft(&mut tx, company_id, run_id).await?;

        let on_hand: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(quantity, 0) FROM item_stocks WHERE item_id = $1 AND warehouse_id = $2",
        )
        .bind(input.item_id)
        .bind(run.warehouse_id)
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or(Decimal::ZERO);

        if on_hand < input.quantity {
            return Err(AppError::InsufficientStock(format!(
                "requested {} but only {} on hand",
                input.quantity, on_hand
            )));
        }

        let material = sqlx::query_as::<_, ProductionMaterialRecord>(
            r#"
            INSERT INTO production_materials (run_id, item_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING id, run_id, item_id, quantity, unit_cost
            "#,
        )
        .bind(run_id)
        .bind(input.item_id)
        .bind(input.quantity)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(material)
    }

    /// Remove a planned material from a draft run
    pub async fn remove_material(
        &self,
        company_id: Uuid,
        run_id: Uuid,
        material_id: Uuid,
    ) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        Self::fetch_draft(&mut tx, company_id, run_id).await?;

        let affected =
            sqlx::query("DELETE FROM production_materials WHERE id = $1 AND run_id = $2")
                .bind(material_id)
                .bind(run_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        if affected == 0 {
            return Err(AppError::NotFound("Production material".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Add an extra cost (labor, utilities) to a draft run.
    ///
    /// The cash outflow is real at the moment it is recorded, so the entry
    /// posts now as production overhead. Completion absorbs it into the
    /// output; draft deletion reverses it.
    pub async fn add_cost(
        &self,
        company_id: Uuid,
        actor_id: Uuid,
        run_id: Uuid,
        input: AddCostInput,
    ) -> AppResult<ProductionCostRecord> {
        validate_positive_amount(input.amount).map_err(|msg| AppError::Validation {
            field: "amount".to_string(),
            message: msg.to_string(),
        })?;
        if input.label.trim().is_empty() {
            return Err(AppError::Validation {
                field: "label".to_string(),
                message: "Label must not be empty".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;
        let run = Self::fetch_draft(&mut tx, company_id, run_id).await?;

        let cost = sqlx::query_as::<_, ProductionCostRecord>(
            r#"
            INSERT INTO production_costs (run_id, label, amount)
            VALUES ($1, $2, $3)
            RETURNING id, run_id, label, amount
            "#,
        )
        .bind(run_id)
        .bind(input.label.trim())
        .bind(input.amount)
        .fetch_one(&mut *tx)
        .await?;

        JournalService::post_in_tx(
            &mut tx,
            company_id,
            JournalEventType::Production,
            cost.id,
            run.run_date,
            &format!("Production cost: {}", cost.label),
            actor_id,
            &production_extra_cost_lines(cost.amount),
        )
        .await?;

        tx.commit().await?;
        Ok(cost)
    }

    /// Complete a draft run: consume every material, receive the output at
    /// (material cost + extra cost) / output quantity, post the production
    /// entry and freeze the run. All in one transaction.
    pub async fn complete_run(
        &self,
        company_id: Uuid,
        actor_id: Uuid,
        run_id: Uuid,
    ) -> AppResult<ProductionRunRecord> {
        let mut tx = self.db.begin().await?;
        let run = Self::fetch_draft(&mut tx, company_id, run_id).await?;

        let materials = sqlx::query_as::<_, ProductionMaterialRecord>(
            "SELECT id, run_id, item_id, quantity, unit_cost FROM production_materials WHERE run_id = $1 ORDER BY id",
        )
        .bind(run_id)
        .fetch_all(&mut *tx)
        .await?;

        if materials.is_empty() {
            return Err(AppError::Validation {
                field: "materials".to_string(),
                message: "A run must consume at least one material".to_string(),
            });
        }

        let method = valuation::company_method_in_tx(&mut tx, company_id).await?;

        let mut material_cost = Decimal::ZERO;
        for material in &materials {
            let outcome = InventoryService::deduct_in_tx(
                &mut tx,
                company_id,
                material.item_id,
                run.warehouse_id,
                material.quantity,
                method,
                MovementType::ProductionConsume,
                Some(run_id),
            )
            .await?;

            material_cost += outcome.total_cost;

            // Freeze the consumption cost on the material row
            sqlx::query("UPDATE production_materials SET unit_cost = $1 WHERE id = $2")
                .bind(outcome.unit_cost)
                .bind(material.id)
                .execute(&mut *tx)
                .await?;
        }

        let extra_cost: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM production_costs WHERE run_id = $1",
        )
        .bind(run_id)
        .fetch_one(&mut *tx)
        .await?;

        let unit_cost = output_unit_cost(material_cost, extra_cost, run.output_quantity)
            .map_err(|e| AppError::Validation {
                field: "output_quantity".to_string(),
                message: e.to_string(),
            })?;

        InventoryService::receive_in_tx(
            &mut tx,
            company_id,
            run.output_item_id,
            run.warehouse_id,
            run.output_quantity,
            unit_cost,
            MovementType::ProductionOutput,
            Some(run_id),
        )
        .await?;

        let completed = sqlx::query_as::<_, ProductionRunRecord>(
            r#"
            UPDATE production_runs
            SET status = $1, output_unit_cost = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, company_id, output_item_id, warehouse_id, output_quantity, output_unit_cost, status, run_date, created_at
            "#,
        )
        .bind(ProductionStatus::Completed.as_str())
        .bind(unit_cost)
        .bind(run_id)
        .fetch_one(&mut *tx)
        .await?;

        JournalService::post_production_entry(
            &mut tx,
            company_id,
            run_id,
            material_cost,
            extra_cost,
            run.run_date,
            actor_id,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            company_id = %company_id,
            run_id = %run_id,
            material_cost = %material_cost,
            extra_cost = %extra_cost,
            output_unit_cost = %unit_cost,
            "production run completed"
        );

        Ok(completed)
    }

    /// Delete a draft run, reversing any extra-cost entries it posted.
    /// Completed runs are frozen and cannot be deleted.
    pub async fn delete_run(
        &self,
        company_id: Uuid,
        actor_id: Uuid,
        run_id: Uuid,
    ) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let run = sqlx::query_as::<_, ProductionRunRecord>(
            r#"
            SELECT id, company_id, output_item_id, warehouse_id, output_quantity, output_unit_cost, status, run_date, created_at
            FROM production_runs
            WHERE id = $1 AND company_id = $2
            FOR UPDATE
            "#,
        )
        .bind(run_id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Production run".to_string()))?;

        let status = run
            .status
            .parse::<ProductionStatus>()
            .map_err(AppError::Configuration)?;

        if status == ProductionStatus::Completed {
            return Err(AppError::InvalidStateTransition(
                "completed production runs cannot be deleted".to_string(),
            ));
        }

        let costs = sqlx::query_as::<_, ProductionCostRecord>(
            "SELECT id, run_id, label, amount FROM production_costs WHERE run_id = $1 ORDER BY id",
        )
        .bind(run_id)
        .fetch_all(&mut *tx)
        .await?;

        for cost in &costs {
            JournalService::post_in_tx(
                &mut tx,
                company_id,
                JournalEventType::ProductionReversal,
                cost.id,
                run.run_date,
                &format!("Reversal of production cost: {}", cost.label),
                actor_id,
                &reversal_lines(&production_extra_cost_lines(cost.amount)),
            )
            .await?;
        }

        sqlx::query("DELETE FROM production_materials WHERE run_id = $1")
            .bind(run_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM production_costs WHERE run_id = $1")
            .bind(run_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM production_runs WHERE id = $1")
            .bind(run_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// A run with its materials and extra costs
    pub async fn get_run(&self, company_id: Uuid, run_id: Uuid) -> AppResult<RunDetail> {
        let run = sqlx::query_as::<_, ProductionRunRecord>(
            r#"
            SELECT id, company_id, output_item_id, warehouse_id, output_quantity, output_unit_cost, status, run_date, created_at
            FROM production_runs
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(run_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Production run".to_string()))?;

        let materials = sqlx::query_as::<_, ProductionMaterialRecord>(
            "SELECT id, run_id, item_id, quantity, unit_cost FROM production_materials WHERE run_id = $1 ORDER BY id",
        )
        .bind(run_id)
        .fetch_all(&self.db)
        .await?;

        let costs = sqlx::query_as::<_, ProductionCostRecord>(
            "SELECT id, run_id, label, amount FROM production_costs WHERE run_id = $1 ORDER BY id",
        )
        .bind(run_id)
        .fetch_all(&self.db)
        .await?;

        Ok(RunDetail {
            run,
            materials,
            costs,
        })
    }

    /// Load a run and require draft status, locking the row
    async fn fetch_draft(
        tx: &mut Transaction<'_, Postgres>,
        company_id: Uuid,
        run_id: Uuid,
    ) -> AppResult<ProductionRunRecord> {
        let run = sqlx::query_as::<_, ProductionRunRecord>(
            r#"
            SELECT id, company_id, output_item_id, warehouse_id, output_quantity, output_unit_cost, status, run_date, created_at
            FROM production_runs
            WHERE id = $1 AND company_id = $2
            FOR UPDATE
            "#,
        )
        .bind(run_id)
        .bind(company_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Production run".to_string()))?;

        let status = run
            .status
            .parse::<ProductionStatus>()
            .map_err(AppError::Configuration)?;

        if status != ProductionStatus::Draft {
            return Err(AppError::InvalidStateTransition(
                "completed production runs are frozen".to_string(),
            ));
        }

        Ok(run)
    }
}
