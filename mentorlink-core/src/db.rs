use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};

use crate::config::DatabaseConfig;
use crate::error::MentorlinkError;
use crate::models::{
    ForumCategory, ForumPost, ForumPostRow, InterestRequest, InterestStatus, Joined, Match,
    MatchRow, MentorRow, Notification, PersonSummary, Profile, ProfileUpdate, ProfileView,
    ReviewRow, Review, Session, SessionStatus, User, UserRole,
};
use crate::source::{RecordSource, SessionQuery};

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

pub async fn health_check(pool: &PgPool) -> Result<String, sqlx::Error> {
    let row: (String,) = sqlx::query_as("SELECT version()").fetch_one(pool).await?;
    Ok(row.0)
}

/// JSON array holding the `PersonSummary` of the user whose id is `id_expr`.
/// Decodes into `Joined::Many`.
fn person_json(id_expr: &str) -> String {
    format!(
        r#"(SELECT json_agg(json_build_object(
                'id', u."id",
                'name', u."name",
                'profilePicture', pr."profilePicture",
                'city', pr."city",
                'country', pr."country",
                'title', pr."title"))
            FROM "User" u LEFT JOIN "Profile" pr ON pr."userId" = u."id"
            WHERE u."id" = {})"#,
        id_expr
    )
}

const PROFILE_COLUMNS: &str = r#""userId", "title", "company", "bio", "city", "country",
    "yearsOfExperience", "helpsWith", "profilePicture""#;

const SESSION_COLUMNS: &str = r#""id", "mentorId", "menteeId", "title", "scheduledAt",
    "duration", "status", "notes""#;

#[derive(sqlx::FromRow)]
struct MatchRecord {
    #[sqlx(flatten)]
    record: Match,
    partner: Option<Json<Joined<PersonSummary>>>,
}

#[derive(sqlx::FromRow)]
struct ReviewRecord {
    #[sqlx(flatten)]
    review: Review,
    reviewer: Option<Json<Joined<PersonSummary>>>,
}

#[derive(sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
struct MentorRecord {
    #[sqlx(flatten)]
    profile: Profile,
    name: Option<String>,
    ratings: Vec<i32>,
}

#[derive(sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
struct ForumPostRecord {
    #[sqlx(flatten)]
    post: ForumPost,
    author: Option<Json<Joined<PersonSummary>>>,
    reply_count: i64,
    last_reply_at: Option<DateTime<Utc>>,
}

/// `RecordSource` over the backend's Postgres tables.
#[derive(Clone)]
pub struct PgSource {
    pool: PgPool,
}

impl PgSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordSource for PgSource {
    async fn backend_version(&self) -> Result<String, MentorlinkError> {
        Ok(health_check(&self.pool).await?)
    }

    async fn user(&self, user_id: &str) -> Result<Option<User>, MentorlinkError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT "id", "name", "email", "role" FROM "User" WHERE "id" = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn profile(&self, user_id: &str) -> Result<Option<Profile>, MentorlinkError> {
        let query = format!(r#"SELECT {} FROM "Profile" WHERE "userId" = $1"#, PROFILE_COLUMNS);
        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, MentorlinkError> {
        update.validate()?;
        let mut tx = self.pool.begin().await?;

        let select = format!(
            r#"SELECT {} FROM "Profile" WHERE "userId" = $1 FOR UPDATE"#,
            PROFILE_COLUMNS
        );
        let mut profile = sqlx::query_as::<_, Profile>(&select)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .unwrap_or_else(|| Profile::empty(user_id));
        profile.apply(update);

        let upsert = format!(
            r#"
            INSERT INTO "Profile" ({cols})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT ("userId") DO UPDATE SET
                "title" = EXCLUDED."title",
                "company" = EXCLUDED."company",
                "bio" = EXCLUDED."bio",
                "city" = EXCLUDED."city",
                "country" = EXCLUDED."country",
                "yearsOfExperience" = EXCLUDED."yearsOfExperience",
                "helpsWith" = EXCLUDED."helpsWith"
            RETURNING {cols}
            "#,
            cols = PROFILE_COLUMNS
        );
        let saved = sqlx::query_as::<_, Profile>(&upsert)
            .bind(&profile.user_id)
            .bind(&profile.title)
            .bind(&profile.company)
            .bind(&profile.bio)
            .bind(&profile.city)
            .bind(&profile.country)
            .bind(profile.years_of_experience)
            .bind(&profile.helps_with)
            .bind(&profile.profile_picture)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(user_id = %user_id, "profile updated");
        Ok(saved)
    }

    async fn set_profile_picture(
        &self,
        user_id: &str,
        url: &str,
    ) -> Result<Profile, MentorlinkError> {
        let query = format!(
            r#"
            INSERT INTO "Profile" ("userId", "helpsWith", "profilePicture")
            VALUES ($1, '{{}}', $2)
            ON CONFLICT ("userId") DO UPDATE SET "profilePicture" = EXCLUDED."profilePicture"
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );
        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .bind(url)
            .fetch_one(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn sessions(
        &self,
        user_id: &str,
        query: &SessionQuery,
    ) -> Result<Vec<Session>, MentorlinkError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM "Session"
            WHERE ("mentorId" = $1 OR "menteeId" = $1)
              AND ($2::timestamptz IS NULL OR "scheduledAt" >= $2)
              AND ($3::timestamptz IS NULL OR "scheduledAt" < $3)
            ORDER BY "scheduledAt" DESC
            "#,
            SESSION_COLUMNS
        );
        let sessions = sqlx::query_as::<_, Session>(&sql)
            .bind(user_id)
            .bind(query.since)
            .bind(query.until)
            .fetch_all(&self.pool)
            .await?;
        tracing::debug!(user_id = %user_id, count = sessions.len(), "sessions fetched");
        Ok(sessions)
    }

    async fn cancel_session(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<Session, MentorlinkError> {
        let mut tx = self.pool.begin().await?;

        let select = format!(
            r#"SELECT {} FROM "Session" WHERE "id" = $1 FOR UPDATE"#,
            SESSION_COLUMNS
        );
        let session = sqlx::query_as::<_, Session>(&select)
            .bind(session_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| MentorlinkError::not_found(format!("Session {}", session_id)))?;
        session.ensure_cancellable_by(user_id)?;

        let update = format!(
            r#"UPDATE "Session" SET "status" = $2 WHERE "id" = $1 RETURNING {}"#,
            SESSION_COLUMNS
        );
        let cancelled = sqlx::query_as::<_, Session>(&update)
            .bind(session_id)
            .bind(SessionStatus::Cancelled)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(user_id = %user_id, session_id = %session_id, "session cancelled");
        Ok(cancelled)
    }

    async fn reviews_received(&self, user_id: &str) -> Result<Vec<ReviewRow>, MentorlinkError> {
        let query = format!(
            r#"
            SELECT r."id", r."reviewerId", r."reviewedId", r."rating", r."comment",
                   r."createdAt", {} AS reviewer
            FROM "Review" r
            WHERE r."reviewedId" = $1
            ORDER BY r."createdAt" DESC
            "#,
            person_json(r#"r."reviewerId""#)
        );
        let rows = sqlx::query_as::<_, ReviewRecord>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| ReviewRow {
                review: r.review,
                reviewer: r.reviewer.map(|j| j.0),
            })
            .collect())
    }

    async fn matches(&self, user_id: &str) -> Result<Vec<MatchRow>, MentorlinkError> {
        let query = format!(
            r#"
            SELECT m."id", m."user1Id", m."user2Id", m."status", m."matchedAt",
                   m."unreadMessages", {} AS partner
            FROM "Match" m
            WHERE m."user1Id" = $1 OR m."user2Id" = $1
            ORDER BY m."matchedAt" DESC
            "#,
            person_json(r#"CASE WHEN m."user1Id" = $1 THEN m."user2Id" ELSE m."user1Id" END"#)
        );
        let rows = sqlx::query_as::<_, MatchRecord>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| MatchRow {
                record: r.record,
                partner: r.partner.map(|j| j.0),
            })
            .collect())
    }

    async fn notifications(&self, user_id: &str) -> Result<Vec<Notification>, MentorlinkError> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT "id", "userId", "type", "title", "message", "read", "createdAt"
            FROM "Notification"
            WHERE "userId" = $1
            ORDER BY "createdAt" DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn mark_notifications_read(
        &self,
        user_id: &str,
        ids: Option<&[String]>,
    ) -> Result<u64, MentorlinkError> {
        let result = sqlx::query(
            r#"
            UPDATE "Notification" SET "read" = true
            WHERE "userId" = $1 AND "read" = false
              AND ($2::text[] IS NULL OR "id" = ANY($2))
            "#,
        )
        .bind(user_id)
        .bind(ids.map(|ids| ids.to_vec()))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn profile_views(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ProfileView>, MentorlinkError> {
        let rows = sqlx::query_as::<_, ProfileView>(
            r#"
            SELECT "id", "viewerId", "viewedId", "viewedAt"
            FROM "ProfileView"
            WHERE "viewedId" = $1 AND ($2::timestamptz IS NULL OR "viewedAt" >= $2)
            ORDER BY "viewedAt" DESC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn mentors(&self) -> Result<Vec<MentorRow>, MentorlinkError> {
        let rows = sqlx::query_as::<_, MentorRecord>(
            r#"
            SELECT u."id" AS "userId", p."title", p."company", p."bio", p."city", p."country",
                   p."yearsOfExperience", COALESCE(p."helpsWith", '{}') AS "helpsWith",
                   p."profilePicture", u."name",
                   COALESCE(
                       (SELECT array_agg(r."rating") FROM "Review" r WHERE r."reviewedId" = u."id"),
                       '{}'
                   ) AS "ratings"
            FROM "User" u
            LEFT JOIN "Profile" p ON p."userId" = u."id"
            WHERE u."role" = $1
            ORDER BY u."name"
            "#,
        )
        .bind(UserRole::Mentor)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| MentorRow {
                profile: r.profile,
                name: r.name,
                ratings: r.ratings,
            })
            .collect())
    }

    async fn create_interest(
        &self,
        from_user_id: &str,
        to_user_id: &str,
    ) -> Result<InterestRequest, MentorlinkError> {
        if from_user_id == to_user_id {
            return Err(MentorlinkError::validation(
                "You cannot express interest in yourself",
            ));
        }
        let mut tx = self.pool.begin().await?;

        let mentor: Option<(String,)> =
            sqlx::query_as(r#"SELECT "id" FROM "User" WHERE "id" = $1 AND "role" = $2"#)
                .bind(to_user_id)
                .bind(UserRole::Mentor)
                .fetch_optional(&mut *tx)
                .await?;
        if mentor.is_none() {
            return Err(MentorlinkError::not_found(format!("Mentor {}", to_user_id)));
        }

        let pending: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM "InterestRequest"
            WHERE "fromUserId" = $1 AND "toUserId" = $2 AND "status" = $3
            "#,
        )
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(InterestStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;
        if pending > 0 {
            return Err(MentorlinkError::validation(
                "Interest already sent to this mentor",
            ));
        }

        let request = sqlx::query_as::<_, InterestRequest>(
            r#"
            INSERT INTO "InterestRequest" ("id", "fromUserId", "toUserId", "status", "createdAt")
            VALUES ($1, $2, $3, $4, now())
            RETURNING "id", "fromUserId", "toUserId", "status", "createdAt"
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(InterestStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(from = %from_user_id, to = %to_user_id, "interest request created");
        Ok(request)
    }

    async fn forum_categories(&self) -> Result<Vec<ForumCategory>, MentorlinkError> {
        let rows = sqlx::query_as::<_, ForumCategory>(
            r#"SELECT "id", "name", "description" FROM "ForumCategory" ORDER BY "name""#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn forum_posts(
        &self,
        category_id: Option<&str>,
    ) -> Result<Vec<ForumPostRow>, MentorlinkError> {
        let query = format!(
            r#"
            SELECT fp."id", fp."categoryId", fp."authorId", fp."title", fp."content",
                   fp."createdAt", {} AS "author",
                   (SELECT COUNT(*) FROM "ForumReply" fr WHERE fr."postId" = fp."id") AS "replyCount",
                   (SELECT MAX(fr."createdAt") FROM "ForumReply" fr WHERE fr."postId" = fp."id")
                       AS "lastReplyAt"
            FROM "ForumPost" fp
            WHERE ($1::text IS NULL OR fp."categoryId" = $1)
            ORDER BY fp."createdAt" DESC
            "#,
            person_json(r#"fp."authorId""#)
        );
        let rows = sqlx::query_as::<_, ForumPostRecord>(&query)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| ForumPostRow {
                post: r.post,
                author: r.author.map(|j| j.0),
                reply_count: r.reply_count,
                last_reply_at: r.last_reply_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_json_targets_expression() {
        let sql = person_json(r#"r."reviewerId""#);
        assert!(sql.contains(r#"WHERE u."id" = r."reviewerId""#));
        assert!(sql.contains("'profilePicture'"));
    }

    #[test]
    fn test_joined_decodes_from_json_agg_shape() {
        let raw = r#"[{"id":"u1","name":"Ada","profilePicture":null,"city":"Lagos","country":null,"title":null}]"#;
        let joined: Joined<PersonSummary> = serde_json::from_str(raw).unwrap();
        assert_eq!(joined.first().unwrap().city.as_deref(), Some("Lagos"));
    }
}
