#[macro_use]
mod common;

#[cfg(test)]
mod closure {
    tests! {
        counter in closure is OK
        "1"
        "2"
    }

    tests! {
        assign_to_closure in closure is OK
        "local"
        "after f"
        "after f"
        "after g"
    }

    tests! {
        close_over_function_parameter in closure is OK
        "param"
    }

    tests! {
        close_over_later_variable in closure is OK
        "b"
        "a"
    }
}
