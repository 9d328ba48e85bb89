//! Typed rows of the hosted backend's tables.
//!
//! Rows are decoded with serde at the boundary: unknown columns are ignored,
//! missing required columns fail the whole response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row type bound to its table.
pub trait Record: DeserializeOwned + Send + 'static {
    const TABLE: &'static str;
}

macro_rules! record {
    ($ty:ty, $table:literal) => {
        impl Record for $ty {
            const TABLE: &'static str = $table;
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Banner {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub button_text: Option<String>,
    pub button_link: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub order_index: i32,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramType {
    Residential,
    Hybrid,
    Online,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub schedule: String,
    pub intake: String,
    pub program_type: ProgramType,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Teacher {
    pub id: Uuid,
    pub name: String,
    pub position: String,
    pub image_url: String,
    pub bio: String,
    pub facebook_url: Option<String>,
    pub twitter_url: Option<String>,
    pub instagram_url: Option<String>,
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GalleryItem {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AlumniProfile {
    pub id: Uuid,
    pub name: String,
    pub graduation_year: i32,
    pub degree: String,
    pub current_position: String,
    pub organization: String,
    pub location: String,
    pub image_url: String,
    pub bio: String,
    pub testimonial: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Registration {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub program_interest: String,
    pub course_id: Option<Uuid>,
    pub comments: String,
    pub created_at: String,
    #[serde(default)]
    pub contacted: bool,
}

/// Insert payload for the public registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRegistration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub program_interest: String,
    pub course_id: Option<Uuid>,
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DonationInfo {
    pub id: Uuid,
    pub title: String,
    pub qr_code_url: String,
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
    pub ifsc_code: String,
    pub branch: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub subtitle: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Statistic {
    pub id: Uuid,
    pub title: String,
    pub value: i64,
    pub icon_name: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SiteLogo {
    pub id: Uuid,
    pub logo_url: String,
    pub alt_text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DownloadItem {
    pub id: Uuid,
    pub description: String,
    pub file_url: String,
    pub image_url: String,
    pub category: String,
    pub created_at: String,
}

record!(Banner, "banners");
record!(Course, "courses");
record!(Teacher, "teachers");
record!(GalleryItem, "gallery");
record!(AlumniProfile, "alumni_profiles");
record!(Registration, "registrations");
record!(DonationInfo, "donation_info");
record!(Video, "videos");
record!(Statistic, "statistics");
record!(SiteLogo, "site_logo");
record!(DownloadItem, "downloads");
