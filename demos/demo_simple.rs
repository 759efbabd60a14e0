use argot::Parser;

fn main() {
    let mut parser = Parser::new();
    parser.helptext("Usage: demo_simple [flags] [options] [arguments]");
    parser.version("1.2.3");
    parser.add_flag("foo f");
    parser.add_string_option("bar b", "fallback");

    parser.parse();
    println!("{parser}");
}
