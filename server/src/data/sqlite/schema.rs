//! SQLite schema definitions
//!
//! Initial schema with all tables. Lifecycle columns carry CHECK constraints
//! and cross-entity links are real foreign keys.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Projects (before leads/proposals due to FKs)
-- =============================================================================
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    client TEXT,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'active'
        CHECK(status IN ('active', 'on_hold', 'completed', 'archived')),
    start_date INTEGER,
    progress INTEGER NOT NULL DEFAULT 100,
    tasks INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_projects_status ON projects(status);

-- =============================================================================
-- 2. Proposals
-- =============================================================================
CREATE TABLE IF NOT EXISTS proposals (
    id TEXT PRIMARY KEY,
    lead_id TEXT REFERENCES leads(id) ON DELETE SET NULL,
    project_id TEXT REFERENCES projects(id) ON DELETE SET NULL,
    title TEXT NOT NULL CHECK(length(title) >= 1),
    value REAL,
    scope TEXT,
    exclusions TEXT,
    terms TEXT,
    assumptions TEXT,
    status TEXT NOT NULL DEFAULT 'draft'
        CHECK(status IN ('draft', 'sent', 'negotiation', 'follow_up', 'accepted', 'rejected')),
    valid_until INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    CHECK(lead_id IS NULL OR project_id IS NULL)
);

CREATE INDEX IF NOT EXISTS idx_proposals_lead ON proposals(lead_id);
CREATE INDEX IF NOT EXISTS idx_proposals_status ON proposals(status);

-- =============================================================================
-- 3. Leads
-- =============================================================================
CREATE TABLE IF NOT EXISTS leads (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    email TEXT,
    phone TEXT,
    company TEXT,
    source TEXT,
    notes TEXT,
    status TEXT NOT NULL DEFAULT 'new'
        CHECK(status IN ('new', 'contacted', 'qualified', 'proposal_sent',
                         'negotiation', 'follow_up', 'closed_won', 'closed_lost')),
    loss_reason TEXT,
    proposal_id TEXT REFERENCES proposals(id) ON DELETE SET NULL,
    project_id TEXT REFERENCES projects(id) ON DELETE SET NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_leads_status ON leads(status);

-- =============================================================================
-- 4. Project tasks (lightweight checklist rows owned by a project)
-- =============================================================================
CREATE TABLE IF NOT EXISTS project_tasks (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    title TEXT NOT NULL CHECK(length(title) >= 1),
    status TEXT NOT NULL DEFAULT 'pending' CHECK(status IN ('pending', 'done')),
    assignee TEXT,
    due_date INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_project_tasks_project ON project_tasks(project_id);

-- =============================================================================
-- 5. Tasks (standalone board tasks, optionally attached to a project)
-- =============================================================================
CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    project_id TEXT REFERENCES projects(id) ON DELETE SET NULL,
    title TEXT NOT NULL CHECK(length(title) >= 1),
    description TEXT,
    status TEXT NOT NULL DEFAULT 'todo' CHECK(status IN ('todo', 'in_progress', 'done')),
    priority TEXT NOT NULL DEFAULT 'medium' CHECK(priority IN ('low', 'medium', 'high')),
    assignee TEXT,
    due_date INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id);
CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);

CREATE TABLE IF NOT EXISTS subtasks (
    id TEXT PRIMARY KEY,
    task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    title TEXT NOT NULL CHECK(length(title) >= 1),
    done INTEGER NOT NULL DEFAULT 0 CHECK(done IN (0, 1)),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_subtasks_task ON subtasks(task_id);

CREATE TABLE IF NOT EXISTS task_comments (
    id TEXT PRIMARY KEY,
    task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    author TEXT NOT NULL,
    body TEXT NOT NULL CHECK(length(body) >= 1),
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_task_comments_task ON task_comments(task_id);

-- =============================================================================
-- 6. Infrastructure assets
-- =============================================================================
CREATE TABLE IF NOT EXISTS infra_assets (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    type TEXT NOT NULL CHECK(type IN ('domain', 'server', 'email')),
    provider TEXT,
    status TEXT NOT NULL DEFAULT 'active' CHECK(status IN ('active', 'expiring', 'retired')),
    metadata TEXT NOT NULL DEFAULT '{}',
    expires_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_infra_assets_type ON infra_assets(type);

CREATE TABLE IF NOT EXISTS project_infra (
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    asset_id TEXT NOT NULL REFERENCES infra_assets(id) ON DELETE CASCADE,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (project_id, asset_id)
);

CREATE INDEX IF NOT EXISTS idx_project_infra_asset ON project_infra(asset_id);

-- =============================================================================
-- 7. Team members & presence
-- =============================================================================
CREATE TABLE IF NOT EXISTS team_members (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    email TEXT UNIQUE,
    phone TEXT UNIQUE,
    role TEXT,
    password_hash TEXT,
    status TEXT NOT NULL DEFAULT 'offline' CHECK(status IN ('active', 'offline')),
    last_active INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS work_sessions (
    id TEXT PRIMARY KEY,
    member_id TEXT NOT NULL REFERENCES team_members(id) ON DELETE CASCADE,
    started_at INTEGER NOT NULL,
    ended_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_work_sessions_member ON work_sessions(member_id);
CREATE INDEX IF NOT EXISTS idx_work_sessions_open ON work_sessions(member_id) WHERE ended_at IS NULL;

-- =============================================================================
-- 8. Agreements, employees, links
-- =============================================================================
CREATE TABLE IF NOT EXISTS agreements (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL CHECK(length(title) >= 1),
    party TEXT,
    kind TEXT,
    status TEXT NOT NULL DEFAULT 'draft' CHECK(status IN ('draft', 'sent', 'signed', 'expired')),
    body TEXT,
    signed_at INTEGER,
    expires_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS employees (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    email TEXT UNIQUE,
    phone TEXT,
    role TEXT,
    department TEXT,
    start_date INTEGER,
    onboarding_status TEXT NOT NULL DEFAULT 'invited'
        CHECK(onboarding_status IN ('invited', 'docs_pending', 'active')),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS links (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL CHECK(length(title) >= 1),
    url TEXT NOT NULL UNIQUE CHECK(length(url) >= 1),
    category TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- =============================================================================
-- 9. Activity log & one-time codes (append-only)
-- =============================================================================
CREATE TABLE IF NOT EXISTS activity_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_type TEXT NOT NULL,
    entity_id TEXT,
    action TEXT NOT NULL,
    detail TEXT,
    actor TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_activity_entity ON activity_log(entity_type, entity_id);
CREATE INDEX IF NOT EXISTS idx_activity_created ON activity_log(created_at);

CREATE TABLE IF NOT EXISTS otps (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    phone TEXT NOT NULL,
    code TEXT NOT NULL,
    expires_at INTEGER NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_otps_phone ON otps(phone);

-- =============================================================================
-- Seed data: initial team member (credentials set via the API)
-- =============================================================================
INSERT OR IGNORE INTO team_members (id, name, role, status, last_active, created_at, updated_at)
VALUES ('admin', 'Admin', 'owner', 'offline', 0, strftime('%s', 'now'), strftime('%s', 'now'));
"#;
