fn main() {
    // ESP-IDF environment is only needed for firmware images; host builds
    // (tests, fuzzing) skip it entirely.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
