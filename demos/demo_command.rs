use argot::Parser;

fn main() {
    let mut parser = Parser::new();
    parser.helptext("Usage: demo_command [flags] <command>");
    parser.version("1.2.3");

    let command = parser.add_command("boo");
    command.helptext("Usage: demo_command boo [flags] [options]");
    command.add_flag("foo f");
    command.add_string_option("bar b", "fallback");
    command.callback(|name, command| {
        println!("---------- {name} ----------");
        println!("{command}");
        println!("-----------------------------");
    });

    parser.parse();
    println!("{parser}");
}
