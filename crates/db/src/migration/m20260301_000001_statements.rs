//! Initial Folio schema.
//!
//! Creates the chart, ledger, sales order, published income and statement
//! tables, the uniqueness constraints statement generation relies on, and
//! tenant RLS policies keyed on `app.current_tenant_id`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(CHART_OF_ACCOUNTS_SQL).await?;
        db.execute_unprepared(ACCOUNT_ROLE_MAPPINGS_SQL).await?;

        // ============================================================
        // PART 3: LEDGER & SALES
        // ============================================================
        db.execute_unprepared(LEDGER_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(SALES_ORDERS_SQL).await?;
        db.execute_unprepared(PUBLISHED_INCOME_SQL).await?;

        // ============================================================
        // PART 4: STATEMENTS
        // ============================================================
        db.execute_unprepared(STATEMENT_SNAPSHOTS_SQL).await?;
        db.execute_unprepared(STATEMENT_AUDIT_ENTRIES_SQL).await?;

        // ============================================================
        // PART 5: ROW-LEVEL SECURITY
        // ============================================================
        db.execute_unprepared(RLS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM ('asset', 'liability', 'equity', 'revenue', 'expense');
CREATE TYPE normal_balance AS ENUM ('debit', 'credit');
CREATE TYPE ledger_status AS ENUM ('pending', 'completed', 'voided');
CREATE TYPE payment_status AS ENUM ('pending', 'completed', 'refunded');
CREATE TYPE period_type AS ENUM ('monthly', 'quarterly', 'yearly');
CREATE TYPE statement_status AS ENUM ('draft', 'review', 'approved', 'final');
CREATE TYPE audit_action AS ENUM ('created', 'updated', 'approved', 'rejected', 'exported', 'viewed');
";

const CHART_OF_ACCOUNTS_SQL: &str = r"
CREATE TABLE chart_of_accounts (
    id                      UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id               UUID NOT NULL,
    code                    VARCHAR(20) NOT NULL,
    name                    VARCHAR(255) NOT NULL,
    account_type            account_type NOT NULL,
    category                VARCHAR(100),
    normal_balance          normal_balance NOT NULL,
    opening_balance         NUMERIC(19, 4) NOT NULL DEFAULT 0,
    is_active               BOOLEAN NOT NULL DEFAULT true,
    allow_direct_posting    BOOLEAN NOT NULL DEFAULT true,
    is_system_account       BOOLEAN NOT NULL DEFAULT false,
    created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_chart_of_accounts_code UNIQUE (tenant_id, code)
);

CREATE INDEX idx_chart_of_accounts_type ON chart_of_accounts(tenant_id, account_type)
    WHERE is_active AND NOT is_system_account;
";

const ACCOUNT_ROLE_MAPPINGS_SQL: &str = r"
CREATE TABLE account_role_mappings (
    tenant_id       UUID NOT NULL,
    role            VARCHAR(32) NOT NULL,
    account_code    VARCHAR(20) NOT NULL,

    PRIMARY KEY (tenant_id, role),
    CONSTRAINT chk_role_known CHECK (role IN ('cash', 'bank', 'receivable', 'payable', 'inventory'))
);
";

const LEDGER_TRANSACTIONS_SQL: &str = r"
CREATE TABLE ledger_transactions (
    id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id       UUID NOT NULL,
    account_code    VARCHAR(20) NOT NULL,
    debit           NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit          NUMERIC(19, 4) NOT NULL DEFAULT 0,
    occurred_at     TIMESTAMPTZ NOT NULL,
    status          ledger_status NOT NULL DEFAULT 'pending',
    description     TEXT,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_ledger_amounts CHECK (debit >= 0 AND credit >= 0)
);

-- Point-in-time aggregates filter on exactly these columns.
CREATE INDEX idx_ledger_transactions_balance
    ON ledger_transactions(tenant_id, account_code, occurred_at)
    WHERE status = 'completed';
";

const SALES_ORDERS_SQL: &str = r"
CREATE TABLE sales_orders (
    id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id       UUID NOT NULL,
    order_number    VARCHAR(50) NOT NULL,
    order_date      TIMESTAMPTZ NOT NULL,
    total_amount    NUMERIC(19, 4) NOT NULL,
    payment_status  payment_status NOT NULL DEFAULT 'pending',
    delivered_at    TIMESTAMPTZ,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_sales_orders_number UNIQUE (tenant_id, order_number)
);

CREATE INDEX idx_sales_orders_undelivered ON sales_orders(tenant_id, order_date)
    WHERE delivered_at IS NULL AND payment_status = 'completed';
";

const PUBLISHED_INCOME_SQL: &str = r"
CREATE TABLE published_income_statements (
    id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id       UUID NOT NULL,
    period_start    DATE NOT NULL,
    period_end      DATE NOT NULL,
    net_income      NUMERIC(19, 4) NOT NULL,
    published_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_published_income_period UNIQUE (tenant_id, period_start, period_end),
    CONSTRAINT chk_published_income_dates CHECK (period_start <= period_end)
);
";

const STATEMENT_SNAPSHOTS_SQL: &str = r"
CREATE TABLE statement_snapshots (
    id                  UUID PRIMARY KEY,
    tenant_id           UUID NOT NULL,
    statement_number    VARCHAR(50) NOT NULL,
    statement_date      TIMESTAMPTZ NOT NULL,
    period_type         period_type NOT NULL,
    period_start        DATE NOT NULL,
    status              statement_status NOT NULL DEFAULT 'draft',
    assets              JSONB NOT NULL,
    liabilities         JSONB NOT NULL,
    equity              JSONB NOT NULL,
    balance_check       JSONB NOT NULL,
    warnings            JSONB NOT NULL DEFAULT '[]'::jsonb,
    notes               TEXT,
    generated_by        UUID NOT NULL,
    generated_at        TIMESTAMPTZ NOT NULL,
    version             INTEGER NOT NULL DEFAULT 1,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_statement_snapshots_number UNIQUE (tenant_id, statement_number),
    CONSTRAINT uq_statement_snapshots_period UNIQUE (tenant_id, period_type, period_start),
    CONSTRAINT chk_statement_version CHECK (version >= 1)
);

CREATE INDEX idx_statement_snapshots_chain
    ON statement_snapshots(tenant_id, period_type, statement_date DESC);
";

const STATEMENT_AUDIT_ENTRIES_SQL: &str = r"
CREATE TABLE statement_audit_entries (
    id              UUID PRIMARY KEY,
    tenant_id       UUID NOT NULL,
    statement_id    UUID NOT NULL REFERENCES statement_snapshots(id) ON DELETE CASCADE,
    sequence        INTEGER NOT NULL,
    action          audit_action NOT NULL,
    performed_by    UUID NOT NULL,
    details         TEXT NOT NULL,
    changes         JSONB,
    performed_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_statement_audit_sequence UNIQUE (statement_id, sequence)
);

-- Audit entries are append-only.
CREATE OR REPLACE FUNCTION prevent_audit_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'statement audit entries are append-only';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_statement_audit_immutable
    BEFORE UPDATE ON statement_audit_entries
    FOR EACH ROW EXECUTE FUNCTION prevent_audit_mutation();
";

const RLS_SQL: &str = r"
ALTER TABLE chart_of_accounts ENABLE ROW LEVEL SECURITY;
ALTER TABLE account_role_mappings ENABLE ROW LEVEL SECURITY;
ALTER TABLE ledger_transactions ENABLE ROW LEVEL SECURITY;
ALTER TABLE sales_orders ENABLE ROW LEVEL SECURITY;
ALTER TABLE published_income_statements ENABLE ROW LEVEL SECURITY;
ALTER TABLE statement_snapshots ENABLE ROW LEVEL SECURITY;
ALTER TABLE statement_audit_entries ENABLE ROW LEVEL SECURITY;

ALTER TABLE chart_of_accounts FORCE ROW LEVEL SECURITY;
ALTER TABLE account_role_mappings FORCE ROW LEVEL SECURITY;
ALTER TABLE ledger_transactions FORCE ROW LEVEL SECURITY;
ALTER TABLE sales_orders FORCE ROW LEVEL SECURITY;
ALTER TABLE published_income_statements FORCE ROW LEVEL SECURITY;
ALTER TABLE statement_snapshots FORCE ROW LEVEL SECURITY;
ALTER TABLE statement_audit_entries FORCE ROW LEVEL SECURITY;

-- Application sets context per transaction: SET LOCAL app.current_tenant_id = 'tenant-uuid';
CREATE POLICY tenant_isolation ON chart_of_accounts
    USING (tenant_id = current_setting('app.current_tenant_id', true)::UUID);
CREATE POLICY tenant_isolation ON account_role_mappings
    USING (tenant_id = current_setting('app.current_tenant_id', true)::UUID);
CREATE POLICY tenant_isolation ON ledger_transactions
    USING (tenant_id = current_setting('app.current_tenant_id', true)::UUID);
CREATE POLICY tenant_isolation ON sales_orders
    USING (tenant_id = current_setting('app.current_tenant_id', true)::UUID);
CREATE POLICY tenant_isolation ON published_income_statements
    USING (tenant_id = current_setting('app.current_tenant_id', true)::UUID);
CREATE POLICY tenant_isolation ON statement_snapshots
    USING (tenant_id = current_setting('app.current_tenant_id', true)::UUID);
CREATE POLICY tenant_isolation ON statement_audit_entries
    USING (tenant_id = current_setting('app.current_tenant_id', true)::UUID);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS statement_audit_entries CASCADE;
DROP TABLE IF EXISTS statement_snapshots CASCADE;
DROP TABLE IF EXISTS published_income_statements CASCADE;
DROP TABLE IF EXISTS sales_orders CASCADE;
DROP TABLE IF EXISTS ledger_transactions CASCADE;
DROP TABLE IF EXISTS account_role_mappings CASCADE;
DROP TABLE IF EXISTS chart_of_accounts CASCADE;

DROP FUNCTION IF EXISTS prevent_audit_mutation() CASCADE;

DROP TYPE IF EXISTS audit_action;
DROP TYPE IF EXISTS statement_status;
DROP TYPE IF EXISTS period_type;
DROP TYPE IF EXISTS payment_status;
DROP TYPE IF EXISTS ledger_status;
DROP TYPE IF EXISTS normal_balance;
DROP TYPE IF EXISTS account_type;
";
