fn main() {
    tsumego::cli::run();
}
