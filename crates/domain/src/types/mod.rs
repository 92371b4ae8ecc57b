//! Domain types exchanged with the backend

pub mod auth;
pub mod favorite;
pub mod inquiry;
pub mod listing;
pub mod user;

pub use auth::{
    bearer, ChangePasswordRequest, Credentials, LoginRequest, RefreshRequest, RefreshedAccess,
    RegisterRequest, TokenPair,
};
pub use favorite::{find_favorite, Favorite, NewFavorite};
pub use inquiry::{Inquiry, InquiryReply, InquiryUpdate, ListingRef, NewInquiry};
pub use listing::{
    Agent, ContactAgentRequest, Feature, ImageUpload, Listing, ListingDraft, ListingQuery,
    ListingStatus, PropertyImage, PropertyType,
};
pub use user::{ProfileUpdate, Role, User, UserProfile};
