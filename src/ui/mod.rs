/// Rendering for the uploader; pure functions of state
pub mod avatar;
