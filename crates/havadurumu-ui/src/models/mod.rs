// cxx-qt bridges declare `unsafe extern "C++"` blocks
#[allow(unsafe_code)]
pub mod weather_model;
