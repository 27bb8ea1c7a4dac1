fn main() {
    #[cfg(target_os = "windows")]
    {
        let mut res = winres::WindowsResource::new();
        res.set("FileDescription", "RAR Data Analyzer");
        res.set("ProductName", "RAR Data Analyzer");
        res.compile().expect("Failed to compile Windows resources");
    }
}
