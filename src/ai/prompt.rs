//! Instruction sent to the classifier. The catalog is Spanish, so the prompt and the
//! extracted terms are too.

/// Build the classification prompt for a shopper's free-text description
pub fn build_prompt(description: &str) -> String {
    format!(
        r#"Eres un experto en recomendación de perfumes.
Un cliente busca un perfume y lo describe así:
"{description}"

Analiza la descripción. Ten en cuenta la pirámide olfativa habitual:
- Notas de salida (también "salida" o "notas altas"): la primera impresión.
- Notas de corazón (también "corazón" o "notas medias"): aparecen después.
- Notas de fondo (también "fondo" o "notas base"): las que más perduran.

Extrae notas olfativas, familia olfativa, ambiente u ocasión y cualquier otro rasgo relevante.
Todos los términos deben estar en español.

Por ejemplo, en "Notas de salida: pera, lavanda. Corazón: canela. Fondo: ámbar y cedro",
"pera", "lavanda" y "canela" son notas principales, y "ámbar" y "cedro" son notas de fondo.

Responde con un objeto JSON que use solo las claves que apliquen:
- "keywords": lista de cadenas (aromas generales como "vainilla", "oud", "cítrico")
- "scent_family": cadena (por ejemplo "Floral", "Oriental", "Amaderado", "Gourmand")
- "mood_or_occasion": cadena (por ejemplo "noche", "uso diario", "romántico")
- "primary_notes": lista de cadenas (notas de salida y de corazón)
- "secondary_notes": lista de cadenas (notas de fondo)
- "other_characteristics": lista de cadenas (cualquier otra característica)

Ejemplo de respuesta:
{{
  "keywords": ["perfume elegante"],
  "scent_family": "Amaderado Especiado",
  "mood_or_occasion": "para la noche",
  "primary_notes": ["pera", "lavanda", "canela"],
  "secondary_notes": ["ámbar", "cedro"]
}}

Si el cliente menciona notas sin indicar su posición,
inclúyelas en "keywords" o en "primary_notes".
Devuelve únicamente el objeto JSON, válido y con todo el texto en español."#
    )
}
