// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - users : Utilisateurs de la plateforme (role user/admin)
//   - animal : Animaux du refuge (available/pending/adopted)
//   - adoption : Demandes d'adoption (pending/approved/rejected)
//   - volunteer : Candidatures bénévoles (email unique)
//   - donation : Dons (montant Decimal, référence de reçu UUID)
//   - contact : Messages de contact (new/read/closed)
//   - dto : Data Transfer Objects validés pour les requêtes/réponses API
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les statuts sont des colonnes TEXT validées côté services
//   - Les relations entre tables sont définies dans chaque modèle
//
// ============================================================================

pub mod health;
pub mod users;
pub mod animal;
pub mod adoption;
pub mod volunteer;
pub mod donation;
pub mod contact;
pub mod dto;
