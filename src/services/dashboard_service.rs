// ============================================================================
// SERVICE : DASHBOARDS
// ============================================================================
//
// Description:
//   Agrégations en lecture seule pour les vues de synthèse user et admin.
//   Les compteurs indépendants sont lancés en parallèle (futures::try_join!).
//   Les totaux sont les sommes de leurs composantes, ils se recoupent donc
//   toujours avec les compteurs des registres sous-jacents.
//
// Fenêtres temporelles:
//   this_week (depuis lundi), this_month, this_year, last_30_days
//
// ============================================================================

use sea_orm::*;
use rust_decimal::Decimal;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};

use crate::models::{adoption, animal, contact, donation};
use crate::services::ServiceError;
use crate::services::adoption_service::{AdoptionService, AdoptionStats};
use crate::services::animal_service::{AnimalService, AnimalStats};
use crate::services::donation_service::{DonationService, DonationStats};
use crate::services::user_service::{UserService, UserStats};
use crate::services::volunteer_service::{VolunteerService, VolunteerStats};

pub struct DashboardService;

#[derive(Debug, Clone, Copy)]
pub enum Window {
    ThisWeek,
    ThisMonth,
    ThisYear,
    Last30Days,
}

/// Début de la fenêtre temporelle pour un instant donné
pub fn window_start(now: NaiveDateTime, window: Window) -> NaiveDateTime {
    let today = now.date();

    let start_date = match window {
        Window::ThisWeek => today.week(Weekday::Mon).first_day(),
        Window::ThisMonth => NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today),
        Window::ThisYear => NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
        Window::Last30Days => return now - Duration::days(30),
    };

    NaiveDateTime::new(start_date, NaiveTime::MIN)
}

/// Nouveaux enregistrements créés depuis le début d'une fenêtre
#[derive(Debug, serde::Serialize)]
pub struct WindowCounts {
    pub animals: u64,
    pub adoptions: u64,
    pub donations: u64,
}

#[derive(Debug, serde::Serialize)]
pub struct RecentActivity {
    pub this_week: WindowCounts,
    pub this_month: WindowCounts,
    pub this_year: WindowCounts,
    pub last_30_days: WindowCounts,
}

#[derive(Debug, serde::Serialize)]
pub struct ContactCounts {
    pub unread: u64,
    pub total: u64,
}

/// Synthèse admin: tous les registres + activité récente
#[derive(Debug, serde::Serialize)]
pub struct AdminDashboard {
    pub animals: AnimalStats,
    pub adoptions: AdoptionStats,
    pub volunteers: VolunteerStats,
    pub donations: DonationStats,
    pub contacts: ContactCounts,
    pub users: UserStats,
    pub recent: RecentActivity,
}

#[derive(Debug, serde::Serialize)]
pub struct UserAdoptionSummary {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub total: u64,
}

#[derive(Debug, serde::Serialize)]
pub struct UserDonationSummary {
    pub count: u64,
    pub completed_total: Decimal,
}

/// Synthèse d'un utilisateur: ses demandes, ses dons, ses messages
#[derive(Debug, serde::Serialize)]
pub struct UserDashboard {
    pub adoptions: UserAdoptionSummary,
    pub donations: UserDonationSummary,
    pub contacts: u64,
}

impl DashboardService {
    pub async fn user_dashboard(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<UserDashboard, ServiceError> {
        // 1. Demandes d'adoption par statut
        let (pending, approved, rejected) = futures::try_join!(
            adoption::Entity::find()
                .filter(adoption::Column::UserId.eq(user_id))
                .filter(adoption::Column::Status.eq("pending"))
                .count(db),
            adoption::Entity::find()
                .filter(adoption::Column::UserId.eq(user_id))
                .filter(adoption::Column::Status.eq("approved"))
                .count(db),
            adoption::Entity::find()
                .filter(adoption::Column::UserId.eq(user_id))
                .filter(adoption::Column::Status.eq("rejected"))
                .count(db),
        )?;

        // 2. Dons: compteur + total des dons complétés (repli en mémoire)
        let donations = donation::Entity::find()
            .filter(donation::Column::UserId.eq(user_id))
            .all(db)
            .await?;

        let completed_total = donations
            .iter()
            .filter(|d| d.status == "completed")
            .map(|d| d.amount)
            .fold(Decimal::ZERO, |acc, a| acc + a);

        // 3. Messages de contact
        let contacts = contact::Entity::find()
            .filter(contact::Column::UserId.eq(user_id))
            .count(db)
            .await?;

        Ok(UserDashboard {
            adoptions: UserAdoptionSummary {
                pending,
                approved,
                rejected,
                total: pending + approved + rejected,
            },
            donations: UserDonationSummary {
                count: donations.len() as u64,
                completed_total,
            },
            contacts,
        })
    }

    pub async fn admin_dashboard(db: &DatabaseConnection) -> Result<AdminDashboard, ServiceError> {
        // 1. Statistiques par registre
        let (animals, adoptions, volunteers, donations, users) = futures::try_join!(
            AnimalService::stats(db),
            AdoptionService::stats(db),
            VolunteerService::stats(db),
            DonationService::stats(db),
            UserService::stats(db),
        )?;

        // 2. Messages de contact
        let (unread, total_contacts) = futures::try_join!(
            contact::Entity::find()
                .filter(contact::Column::Status.eq("new"))
                .count(db),
            contact::Entity::find().count(db),
        )?;

        // 3. Activité récente par fenêtre
        let now = Utc::now().naive_utc();
        let recent = RecentActivity {
            this_week: Self::window_counts(db, window_start(now, Window::ThisWeek)).await?,
            this_month: Self::window_counts(db, window_start(now, Window::ThisMonth)).await?,
            this_year: Self::window_counts(db, window_start(now, Window::ThisYear)).await?,
            last_30_days: Self::window_counts(db, window_start(now, Window::Last30Days)).await?,
        };

        Ok(AdminDashboard {
            animals,
            adoptions,
            volunteers,
            donations,
            contacts: ContactCounts {
                unread,
                total: total_contacts,
            },
            users,
            recent,
        })
    }

    async fn window_counts(
        db: &DatabaseConnection,
        since: NaiveDateTime,
    ) -> Result<WindowCounts, ServiceError> {
        let (animals, adoptions, donations) = futures::try_join!(
            animal::Entity::find()
                .filter(animal::Column::CreatedAt.gte(since))
                .count(db),
            adoption::Entity::find()
                .filter(adoption::Column::CreatedAt.gte(since))
                .count(db),
            donation::Entity::find()
                .filter(donation::Column::CreatedAt.gte(since))
                .count(db),
        )?;

        Ok(WindowCounts {
            animals,
            adoptions,
            donations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_window_start_week_begins_monday() {
        // Le 18 juin 2025 est un mercredi, le lundi de la semaine est le 16
        let start = window_start(dt(2025, 6, 18, 15, 30), Window::ThisWeek);
        assert_eq!(start, dt(2025, 6, 16, 0, 0));

        // Un lundi reste le même jour
        let start = window_start(dt(2025, 6, 16, 8, 0), Window::ThisWeek);
        assert_eq!(start, dt(2025, 6, 16, 0, 0));
    }

    #[test]
    fn test_window_start_month_and_year() {
        let now = dt(2025, 6, 18, 15, 30);

        assert_eq!(window_start(now, Window::ThisMonth), dt(2025, 6, 1, 0, 0));
        assert_eq!(window_start(now, Window::ThisYear), dt(2025, 1, 1, 0, 0));
    }

    #[test]
    fn test_window_start_last_30_days_keeps_time() {
        let start = window_start(dt(2025, 6, 18, 15, 30), Window::Last30Days);
        assert_eq!(start, dt(2025, 5, 19, 15, 30));
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    fn donation_row(id: i32, amount: &str, status: &str) -> donation::Model {
        donation::Model {
            id,
            user_id: Some(1),
            donor_name: None,
            email: None,
            amount: amount.parse().unwrap(),
            message: None,
            reference: format!("ref-{}", id),
            status: status.to_string(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_user_dashboard_reconciles() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // compteurs d'adoptions: pending, approved, rejected
            .append_query_results([vec![count_row(2)]])
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![count_row(0)]])
            // dons de l'utilisateur
            .append_query_results([vec![
                donation_row(1, "15.00", "completed"),
                donation_row(2, "10.00", "pending"),
            ]])
            // messages de contact
            .append_query_results([vec![count_row(1)]])
            .into_connection();

        let dashboard = DashboardService::user_dashboard(&db, 1).await.unwrap();

        assert_eq!(dashboard.adoptions.total, 3);
        assert_eq!(
            dashboard.adoptions.total,
            dashboard.adoptions.pending + dashboard.adoptions.approved + dashboard.adoptions.rejected
        );
        assert_eq!(dashboard.donations.count, 2);
        assert_eq!(
            dashboard.donations.completed_total,
            "15.00".parse::<Decimal>().unwrap()
        );
        assert_eq!(dashboard.contacts, 1);
    }
}
