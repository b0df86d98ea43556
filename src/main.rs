fn main() -> anyhow::Result<()> {
    netorbit::run()
}
