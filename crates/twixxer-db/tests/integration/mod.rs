mod chirp_tests;
mod profile_tests;
