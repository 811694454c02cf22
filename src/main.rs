fn main() -> anyhow::Result<()> {
    manual_signaling_lib::run()
}
