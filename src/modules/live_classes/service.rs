use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, info, instrument};

use scholaris_core::{AppError, PaginationMeta};
use scholaris_models::Requester;
use scholaris_models::classes::Class;
use scholaris_models::ids::{ClassId, LiveClassId, SchoolId, SubjectId};
use scholaris_models::live_classes::{
    BroadcastLiveClassDto, BroadcastResult, CreateLiveClassDto, LiveClass, LiveClassFilterParams,
    LiveClassView, PaginatedLiveClassesResponse, UpdateLiveClassDto,
};
use scholaris_models::subjects::Subject;
use scholaris_policy::guard::check_class_subject_scope;
use scholaris_policy::propagation::match_across_schools;
use scholaris_policy::{
    EntityKind, OwnedRecord, ScopeColumns, WriteAction, can_write, read_scope, record_permissions,
};

use crate::metrics::track_live_class_broadcast;
use crate::modules::classes::service::CLASS_COLUMNS;
use crate::modules::subjects::service::{SUBJECT_COLUMNS, SubjectService};
use crate::utils::auth_helpers::{enforce, target_school};
use crate::utils::scope::bind_scope;

const COLUMNS: ScopeColumns = ScopeColumns::school("school_id").with_class("class_id");

const LIVE_CLASS_COLUMNS: &str = "id, title, description, meeting_url, school_id, class_id, \
     subject_id, starts_at, duration_minutes, owner_role, created_by, is_active, deleted_at, \
     created_at, updated_at";

/// Fields shared by a single live class and a broadcast.
struct Session<'a> {
    title: &'a str,
    description: Option<&'a str>,
    meeting_url: &'a str,
    starts_at: DateTime<Utc>,
    duration_minutes: i32,
}

pub struct LiveClassService;

impl LiveClassService {
    fn view(requester: &Requester, live_class: LiveClass) -> LiveClassView {
        let permissions = record_permissions(requester, &OwnedRecord::from(&live_class));
        LiveClassView {
            live_class,
            permissions,
        }
    }

    async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        requester: &Requester,
        session: &Session<'_>,
        school_id: SchoolId,
        class_id: ClassId,
        subject_id: SubjectId,
    ) -> Result<LiveClass, AppError> {
        let live_class = sqlx::query_as::<_, LiveClass>(&format!(
            "INSERT INTO live_classes
                (title, description, meeting_url, school_id, class_id, subject_id,
                 starts_at, duration_minutes, owner_role, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {LIVE_CLASS_COLUMNS}"
        ))
        .bind(session.title)
        .bind(session.description)
        .bind(session.meeting_url)
        .bind(school_id)
        .bind(class_id)
        .bind(subject_id)
        .bind(session.starts_at)
        .bind(session.duration_minutes)
        .bind(requester.role)
        .bind(requester.user_id)
        .fetch_one(executor)
        .await?;

        Ok(live_class)
    }

    #[instrument(skip(db, requester, dto), fields(db.operation = "INSERT", db.table = "live_classes"))]
    pub async fn create_live_class(
        db: &PgPool,
        requester: &Requester,
        dto: CreateLiveClassDto,
    ) -> Result<LiveClassView, AppError> {
        let school_id = target_school(requester, dto.school_id)?;
        enforce(
            requester,
            EntityKind::LiveClass,
            WriteAction::Create,
            can_write(
                requester,
                WriteAction::Create,
                &OwnedRecord::authored_by(requester, school_id),
            ),
        )?;

        let (class, subject) =
            SubjectService::find_with_class(db, dto.class_id, dto.subject_id).await?;
        check_class_subject_scope(school_id, &class, &subject)?;

        let session = Session {
            title: &dto.title,
            description: dto.description.as_deref(),
            meeting_url: &dto.meeting_url,
            starts_at: dto.starts_at,
            duration_minutes: dto.duration_minutes,
        };
        let live_class =
            Self::insert(db, requester, &session, school_id, class.id, subject.id).await?;

        info!(live_class.id = %live_class.id, owner_role = %live_class.owner_role, "Live class created");
        Ok(Self::view(requester, live_class))
    }

    /// Schedules one live class in every target school that has a class and
    /// subject named like the source selection. Schools without a match are
    /// skipped and reported; the rest are created together.
    #[instrument(skip(db, requester, dto), fields(targets = dto.target_school_ids.len(), db.operation = "INSERT", db.table = "live_classes"))]
    pub async fn broadcast(
        db: &PgPool,
        requester: &Requester,
        dto: BroadcastLiveClassDto,
    ) -> Result<BroadcastResult, AppError> {
        for &school_id in &dto.target_school_ids {
            enforce(
                requester,
                EntityKind::LiveClass,
                WriteAction::Create,
                can_write(
                    requester,
                    WriteAction::Create,
                    &OwnedRecord::authored_by(requester, school_id),
                ),
            )?;
        }

        // A source outside the requester's school reads as missing.
        if !requester.is_super_admin() && !requester.belongs_to(dto.source_school_id) {
            return Err(AppError::not_found("Class not found"));
        }

        let (class, subject) =
            SubjectService::find_with_class(db, dto.class_id, dto.subject_id).await?;
        check_class_subject_scope(dto.source_school_id, &class, &subject)?;

        let target_ids: Vec<i64> = dto.target_school_ids.iter().map(|s| s.get()).collect();

        let classes = sqlx::query_as::<_, Class>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes
             WHERE school_id = ANY($1) AND name = $2 ORDER BY id"
        ))
        .bind(&target_ids)
        .bind(&class.name)
        .fetch_all(db)
        .await?;

        let subjects = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects
             WHERE school_id = ANY($1) AND name = $2 ORDER BY id"
        ))
        .bind(&target_ids)
        .bind(&subject.name)
        .fetch_all(db)
        .await?;

        let matched = match_across_schools(
            &class.name,
            &subject.name,
            &dto.target_school_ids,
            &classes,
            &subjects,
        );

        let session = Session {
            title: &dto.title,
            description: dto.description.as_deref(),
            meeting_url: &dto.meeting_url,
            starts_at: dto.starts_at,
            duration_minutes: dto.duration_minutes,
        };

        let mut tx = db.begin().await?;
        let mut created = Vec::with_capacity(matched.matched.len());
        for target in &matched.matched {
            let live_class = Self::insert(
                &mut *tx,
                requester,
                &session,
                target.school_id,
                target.class_id,
                target.subject_id,
            )
            .await
            .map_err(AppError::in_transaction)?;
            created.push(live_class);
        }
        tx.commit().await.map_err(AppError::transaction_failure)?;

        track_live_class_broadcast(created.len(), matched.skipped.len());
        info!(
            created = created.len(),
            skipped = matched.skipped.len(),
            "Live class broadcast"
        );

        Ok(BroadcastResult {
            created,
            skipped_school_ids: matched.skipped,
        })
    }

    #[instrument(skip(db, requester, filters), fields(db.operation = "SELECT", db.table = "live_classes"))]
    pub async fn get_live_classes(
        db: &PgPool,
        requester: &Requester,
        filters: LiveClassFilterParams,
    ) -> Result<PaginatedLiveClassesResponse, AppError> {
        let predicate = read_scope(requester, EntityKind::LiveClass).sql_predicate(&COLUMNS, 1);
        let mut where_clause = format!("WHERE is_active AND {}", predicate.sql);
        let mut next = predicate.next_param(1);

        if filters.school_id.is_some() {
            where_clause.push_str(&format!(" AND school_id = ${next}"));
            next += 1;
        }
        if filters.class_id.is_some() {
            where_clause.push_str(&format!(" AND class_id = ${next}"));
        }

        let count_sql = format!("SELECT COUNT(*) FROM live_classes {where_clause}");
        let mut count_query = bind_scope!(sqlx::query_scalar::<_, i64>(&count_sql), predicate);
        if let Some(school_id) = filters.school_id {
            count_query = count_query.bind(school_id);
        }
        if let Some(class_id) = filters.class_id {
            count_query = count_query.bind(class_id);
        }
        let total = count_query.fetch_one(db).await?;

        let data_sql = format!(
            "SELECT {LIVE_CLASS_COLUMNS} FROM live_classes {where_clause}
             ORDER BY starts_at DESC, id DESC LIMIT {} OFFSET {}",
            filters.pagination.limit(),
            filters.pagination.offset()
        );
        let mut data_query = bind_scope!(sqlx::query_as::<_, LiveClass>(&data_sql), predicate);
        if let Some(school_id) = filters.school_id {
            data_query = data_query.bind(school_id);
        }
        if let Some(class_id) = filters.class_id {
            data_query = data_query.bind(class_id);
        }
        let rows = data_query.fetch_all(db).await?;

        debug!(total, returned = rows.len(), "Fetched live classes");

        Ok(PaginatedLiveClassesResponse {
            data: rows.into_iter().map(|l| Self::view(requester, l)).collect(),
            meta: PaginationMeta::new(&filters.pagination, total),
        })
    }

    /// Writes load the row regardless of read scope so that a requester
    /// outside the owning school gets a denial rather than a miss.
    async fn find_active(db: &PgPool, live_class_id: LiveClassId) -> Result<LiveClass, AppError> {
        sqlx::query_as::<_, LiveClass>(&format!(
            "SELECT {LIVE_CLASS_COLUMNS} FROM live_classes WHERE id = $1 AND is_active"
        ))
        .bind(live_class_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Live class not found"))
    }

    async fn find_visible(
        db: &PgPool,
        requester: &Requester,
        live_class_id: LiveClassId,
    ) -> Result<LiveClass, AppError> {
        let scope = read_scope(requester, EntityKind::LiveClass);

        let live_class = Self::find_active(db, live_class_id).await?;
        if !scope.admits(Some(live_class.school_id), Some(live_class.class_id), None) {
            return Err(AppError::not_found("Live class not found"));
        }
        Ok(live_class)
    }

    #[instrument(skip(db, requester), fields(db.operation = "SELECT", db.table = "live_classes"))]
    pub async fn get_live_class_by_id(
        db: &PgPool,
        requester: &Requester,
        live_class_id: LiveClassId,
    ) -> Result<LiveClassView, AppError> {
        let live_class = Self::find_visible(db, requester, live_class_id).await?;
        Ok(Self::view(requester, live_class))
    }

    #[instrument(skip(db, requester, dto), fields(db.operation = "UPDATE", db.table = "live_classes"))]
    pub async fn update_live_class(
        db: &PgPool,
        requester: &Requester,
        live_class_id: LiveClassId,
        dto: UpdateLiveClassDto,
    ) -> Result<LiveClassView, AppError> {
        let live_class = Self::find_active(db, live_class_id).await?;
        enforce(
            requester,
            EntityKind::LiveClass,
            WriteAction::Modify,
            can_write(requester, WriteAction::Modify, &OwnedRecord::from(&live_class)),
        )?;

        let live_class = sqlx::query_as::<_, LiveClass>(&format!(
            "UPDATE live_classes SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                meeting_url = COALESCE($4, meeting_url),
                starts_at = COALESCE($5, starts_at),
                duration_minutes = COALESCE($6, duration_minutes),
                updated_at = NOW()
             WHERE id = $1 AND is_active
             RETURNING {LIVE_CLASS_COLUMNS}"
        ))
        .bind(live_class_id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.meeting_url)
        .bind(dto.starts_at)
        .bind(dto.duration_minutes)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Live class not found"))?;

        Ok(Self::view(requester, live_class))
    }

    /// Soft delete: the row stays with `is_active = false` and `deleted_at` set.
    #[instrument(skip(db, requester), fields(db.operation = "UPDATE", db.table = "live_classes"))]
    pub async fn delete_live_class(
        db: &PgPool,
        requester: &Requester,
        live_class_id: LiveClassId,
    ) -> Result<(), AppError> {
        let live_class = Self::find_active(db, live_class_id).await?;
        enforce(
            requester,
            EntityKind::LiveClass,
            WriteAction::Delete,
            can_write(requester, WriteAction::Delete, &OwnedRecord::from(&live_class)),
        )?;

        let result = sqlx::query(
            "UPDATE live_classes SET is_active = FALSE, deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND is_active",
        )
        .bind(live_class_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Live class not found"));
        }

        info!(live_class.id = %live_class_id, deleted_by = %requester.user_id, "Live class deleted");
        Ok(())
    }
}
