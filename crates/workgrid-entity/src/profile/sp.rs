//! Service-provider profile and its KYC progression.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// KYC workflow state of an SP.
///
/// `PROFILE_INCOMPLETE → KYC_PENDING → KYC_SUBMITTED → KYC_APPROVED | KYC_REJECTED → ACTIVE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "kyc_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    /// Required personal fields are still missing.
    ProfileIncomplete,
    /// Profile is complete; documents not yet submitted.
    KycPending,
    /// Documents submitted, awaiting review.
    KycSubmitted,
    /// Review passed.
    KycApproved,
    /// Review failed.
    KycRejected,
    /// Fully onboarded.
    Active,
}

/// Gender as recorded on an SP profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Profile of an SP user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SpProfile {
    /// Owning user.
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    /// Current KYC state.
    pub kyc_status: KycStatus,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Partial update of an SP profile. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpProfile {
    pub full_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
}

impl SpProfile {
    /// A fresh profile for a newly signed-up SP.
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            full_name: None,
            city: None,
            state: None,
            pincode: None,
            gender: None,
            date_of_birth: None,
            kyc_status: KycStatus::ProfileIncomplete,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether all six fields needed before KYC can start are present.
    pub fn has_required_fields(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.full_name)
            && filled(&self.city)
            && filled(&self.state)
            && filled(&self.pincode)
            && self.gender.is_some()
            && self.date_of_birth.is_some()
    }

    /// Merge `update` into the profile, advancing `PROFILE_INCOMPLETE` to
    /// `KYC_PENDING` once every required field is present.
    ///
    /// Returns `true` when the KYC status changed.
    pub fn apply_update(&mut self, update: UpdateSpProfile) -> bool {
        if let Some(v) = update.full_name {
            self.full_name = Some(v);
        }
        if let Some(v) = update.city {
            self.city = Some(v);
        }
        if let Some(v) = update.state {
            self.state = Some(v);
        }
        if let Some(v) = update.pincode {
            self.pincode = Some(v);
        }
        if let Some(v) = update.gender {
            self.gender = Some(v);
        }
        if let Some(v) = update.date_of_birth {
            self.date_of_birth = Some(v);
        }
        self.updated_at = Utc::now();

        if self.kyc_status == KycStatus::ProfileIncomplete && self.has_required_fields() {
            self.kyc_status = KycStatus::KycPending;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_update() -> UpdateSpProfile {
        UpdateSpProfile {
            full_name: Some("Asha Rao".into()),
            city: Some("Pune".into()),
            state: Some("MH".into()),
            pincode: Some("411001".into()),
            gender: Some(Gender::Female),
            date_of_birth: NaiveDate::from_ymd_opt(1992, 4, 12),
        }
    }

    #[test]
    fn test_advances_only_when_all_fields_present() {
        let mut profile = SpProfile::new(Uuid::new_v4());
        let mut partial = complete_update();
        partial.date_of_birth = None;

        assert!(!profile.apply_update(partial));
        assert_eq!(profile.kyc_status, KycStatus::ProfileIncomplete);

        let changed = profile.apply_update(UpdateSpProfile {
            date_of_birth: NaiveDate::from_ymd_opt(1992, 4, 12),
            ..Default::default()
        });
        assert!(changed);
        assert_eq!(profile.kyc_status, KycStatus::KycPending);
    }

    #[test]
    fn test_blank_strings_do_not_count() {
        let mut profile = SpProfile::new(Uuid::new_v4());
        let mut update = complete_update();
        update.city = Some("   ".into());
        profile.apply_update(update);
        assert_eq!(profile.kyc_status, KycStatus::ProfileIncomplete);
    }

    #[test]
    fn test_later_states_are_not_touched() {
        let mut profile = SpProfile::new(Uuid::new_v4());
        profile.kyc_status = KycStatus::KycSubmitted;
        assert!(!profile.apply_update(complete_update()));
        assert_eq!(profile.kyc_status, KycStatus::KycSubmitted);
    }
}
