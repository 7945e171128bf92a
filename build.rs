fn main() {
    // Only the firmware build needs the ESP-IDF environment; host builds
    // and tests run without it.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
