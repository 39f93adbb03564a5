fn main() {
    // ESP-IDF builds need the sysenv emitted by embuild; host builds
    // (tests, fuzzing) have nothing to generate.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
