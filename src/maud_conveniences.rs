use maud::{Markup, Render, html};

pub fn render_table<const N: usize>(
    overall_title: &'static str,
    titles: [&'static str; N],
    items: Vec<[Markup; N]>,
) -> Markup {
    html! {
        div class="container mx-auto" {
            (title(overall_title))
            div class="overflow-x-auto" {
                table class="min-w-full bg-gray-800 rounded shadow-md" {
                    thead class="bg-gray-700" {
                        tr {
                            @for title in titles {
                                th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                            }
                        }
                    }
                    tbody {
                        @for row in items {
                            tr {
                                @for col in row {
                                    td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn subtitle(s: impl Render) -> Markup {
    html! {
        h2 class="text-xl font-semibold mb-2" {(s)}
    }
}

pub fn simple_form_element(
    id: &'static str,
    text: &'static str,
    required: bool,
    input_type: Option<&'static str>,
) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2" {(text)}
            input type=(input_type.unwrap_or("text")) id=(id) name=(id) required[required] class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600" {}
        }
    }
}

pub fn form_submit_button(text: &'static str, danger: bool) -> Markup {
    let colour = if danger {
        "bg-red-600 hover:bg-red-800"
    } else {
        "bg-blue-600 hover:bg-blue-800"
    };

    html! {
        div class="flex items-center justify-between" {
            button type="submit" class={(colour) " font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline"} {
                (text)
            }
        }
    }
}

pub fn alert(success: bool, message: impl Render) -> Markup {
    let class = if success {
        "bg-green-100 border border-green-400 text-green-700 px-4 py-3 rounded mb-4"
    } else {
        "bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded mb-4"
    };

    html! {
        div role="alert" class=(class) {
            span {(message)}
        }
    }
}
