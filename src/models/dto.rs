//DTOs validés pour les requêtes et réponses structurées
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Vérifie un numéro de téléphone: chiffres + séparateurs usuels, 7 à 15 chiffres
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '.' | '(' | ')'));

    allowed && (7..=15).contains(&digits)
}

// ---------------------------------------------------------------------------
// Animaux
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateAnimalRequest {
    #[validate(length(min = 2, max = 50))]
    pub species: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(range(min = 0, max = 40))]
    pub age: i32,
    #[validate(length(min = 1, max = 100))]
    pub breed: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateAnimalRequest {
    #[validate(length(min = 2, max = 50))]
    pub species: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(range(min = 0, max = 40))]
    pub age: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub breed: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub description: Option<String>,
}

/// Filtres de recherche conjonctifs (tous optionnels)
#[derive(Debug, Default, Deserialize)]
pub struct AnimalSearchQuery {
    pub species: Option<String>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub breed: Option<String>,
    pub status: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
}

// ---------------------------------------------------------------------------
// Adoptions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateAdoptionRequest {
    pub animal_id: i32,
    #[validate(length(min = 1, max = 100))]
    pub firstname: String,
    #[validate(length(min = 1, max = 100))]
    pub lastname: String,
    #[validate(length(min = 7, max = 20))]
    pub phone: String,
}

/// Corps de PUT /admin/adoptions/{id}
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DecideAdoptionRequest {
    pub status: String, // 'approved' ou 'rejected'
    #[validate(length(max = 1000))]
    pub admin_comment: Option<String>,
}

/// Résumé de l'animal joint à une demande d'adoption
#[derive(Debug, Serialize)]
pub struct AnimalSummary {
    pub id: i32,
    pub species: String,
    pub name: String,
    pub city: String,
    pub status: String,
}

/// Résumé de l'utilisateur joint à une demande d'adoption
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

/// Demande d'adoption avec ses résumés animal/utilisateur
#[derive(Debug, Serialize)]
pub struct AdoptionWithDetails {
    pub id: i32,
    pub status: String,
    pub firstname: String,
    pub lastname: String,
    pub phone: String,
    pub admin_comment: Option<String>,
    pub created_at: Option<chrono::NaiveDateTime>,
    pub animal: Option<AnimalSummary>,
    pub user: Option<UserSummary>,
}

// ---------------------------------------------------------------------------
// Bénévoles
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateVolunteerRequest {
    #[validate(length(min = 1, max = 100))]
    pub firstname: String,
    #[validate(length(min = 1, max = 100))]
    pub lastname: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 7, max = 20))]
    pub phone: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(max = 500))]
    pub availability: Option<String>,
    #[validate(length(max = 2000))]
    pub motivation: Option<String>,
}

/// Mise à jour de statut générique (bénévoles, animaux, dons, contact)
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusRequest {
    #[validate(length(min = 1, max = 30))]
    pub status: String,
}

// ---------------------------------------------------------------------------
// Dons
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateDonationRequest {
    #[validate(range(min = 0.01, max = 1000000.0))]
    pub amount: f64,
    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateAnonymousDonationRequest {
    #[validate(length(min = 1, max = 200))]
    pub donor_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(range(min = 0.01, max = 1000000.0))]
    pub amount: f64,
    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateContactRequest {
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateAnonymousContactRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Utilisateurs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub firstname: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub lastname: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 30))]
    pub role: String, // 'user' ou 'admin'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("+1 514-555-0199"));
        assert!(is_valid_phone("0612345678"));
        assert!(is_valid_phone("(438) 555.0123"));

        assert!(!is_valid_phone("12345")); // trop court
        assert!(!is_valid_phone("abc-def-ghij")); // pas de chiffres
        assert!(!is_valid_phone("12345678901234567890")); // trop long
    }

    #[test]
    fn test_create_volunteer_request_validation() {
        let valid = CreateVolunteerRequest {
            firstname: "Marie".to_string(),
            lastname: "Tremblay".to_string(),
            email: "marie@exemple.com".to_string(),
            phone: "514-555-0100".to_string(),
            city: "Montréal".to_string(),
            availability: Some("week-ends".to_string()),
            motivation: None,
        };
        assert!(valid.validate().is_ok());

        let bad_email = CreateVolunteerRequest {
            email: "pas-un-email".to_string(),
            ..valid_volunteer()
        };
        let errors = bad_email.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_create_animal_request_age_bounds() {
        let mut req = CreateAnimalRequest {
            species: "chien".to_string(),
            name: "Rex".to_string(),
            city: "Québec".to_string(),
            age: 3,
            breed: "Labrador".to_string(),
            description: "Très affectueux".to_string(),
        };
        assert!(req.validate().is_ok());

        req.age = -1;
        assert!(req.validate().is_err());

        req.age = 55;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_donation_amount_must_be_positive() {
        let req = CreateDonationRequest {
            amount: 0.0,
            message: None,
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount"));
    }

    fn valid_volunteer() -> CreateVolunteerRequest {
        CreateVolunteerRequest {
            firstname: "Marie".to_string(),
            lastname: "Tremblay".to_string(),
            email: "marie@exemple.com".to_string(),
            phone: "514-555-0100".to_string(),
            city: "Montréal".to_string(),
            availability: None,
            motivation: None,
        }
    }
}
