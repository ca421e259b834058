fn main() {
    culturas_lib::run()
}
